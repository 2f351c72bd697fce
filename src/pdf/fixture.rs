//! In-memory PDFs for tests. Every page draws the text "Page N".

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

fn page_content(doc: &mut Document, number: u32) -> ObjectId {
    let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", number);
    doc.add_object(Stream::new(dictionary! {}, content.into_bytes()))
}

fn shared_resources(doc: &mut Document) -> ObjectId {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    })
}

fn letter() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ])
}

fn finish(mut doc: Document, tree_id: ObjectId) -> Vec<u8> {
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => tree_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture serializes");
    bytes
}

/// A flat document with `pages` pages.
pub fn sample_pdf(pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let tree_id = doc.new_object_id();
    let resources_id = shared_resources(&mut doc);

    let mut kids = Vec::new();
    for number in 1..=pages {
        let contents = page_content(&mut doc, number);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => tree_id,
            "Contents" => contents,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        tree_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => letter(),
        }),
    );

    finish(doc, tree_id)
}

/// Four pages split across two intermediate nodes; the second node rotates
/// its pages (3 and 4) by 90 degrees.
pub fn nested_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let tree_id = doc.new_object_id();
    let resources_id = shared_resources(&mut doc);

    let mut nodes = Vec::new();
    for (first, rotate) in [(1u32, None), (3u32, Some(90i64))] {
        let node_id = doc.new_object_id();
        let mut kids = Vec::new();
        for number in first..first + 2 {
            let contents = page_content(&mut doc, number);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => node_id,
                "Contents" => contents,
            });
            kids.push(Object::Reference(page_id));
        }

        let mut node = dictionary! {
            "Type" => "Pages",
            "Parent" => tree_id,
            "Kids" => kids,
            "Count" => 2i64,
        };
        if let Some(degrees) = rotate {
            node.set("Rotate", degrees);
        }
        doc.objects.insert(node_id, Object::Dictionary(node));
        nodes.push(Object::Reference(node_id));
    }

    doc.objects.insert(
        tree_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => nodes,
            "Count" => 4i64,
            "Resources" => resources_id,
            "MediaBox" => letter(),
        }),
    );

    finish(doc, tree_id)
}

/// The "Page N" label drawn by each page of `bytes`, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("fixture parses");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).expect("page has content");
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').expect("label start") + 1;
            let end = text.find(')').expect("label end");
            text[start..end].to_string()
        })
        .collect()
}
