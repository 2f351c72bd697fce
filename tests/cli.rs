use assert_cmd::Command;
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// A PDF whose page N draws "Page N".
fn write_sample(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let tree_id = doc.new_object_id();

    let mut kids = Vec::new();
    for number in 1..=pages {
        let content = format!("BT 72 720 Td (Page {}) Tj ET", number);
        let contents = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
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
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => tree_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

fn labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let content = String::from_utf8(doc.get_page_content(id).unwrap()).unwrap();
            let start = content.find('(').unwrap() + 1;
            let end = content.find(')').unwrap();
            content[start..end].to_string()
        })
        .collect()
}

fn pdfpick(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pdfpick").unwrap();
    cmd.current_dir(dir).env("RUST_LOG", "off").arg("--no-thumbnails");
    cmd
}

#[test]
fn extract_writes_pages_in_document_order() {
    let dir = tempfile::tempdir().unwrap();
    write_sample(dir.path(), "book.pdf", 6);

    let output = pdfpick(dir.path())
        .args(["extract", "book.pdf", "4,1,3"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Extracted 3 page(s) to book-extracted.pdf"), "{}", stdout);

    assert_eq!(
        labels(&dir.path().join("book-extracted.pdf")),
        vec!["Page 1", "Page 3", "Page 4"]
    );
}

#[test]
fn extract_in_click_order_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    write_sample(dir.path(), "book.pdf", 6);

    let output = pdfpick(dir.path())
        .args(["extract", "book.pdf", "4,1,3", "-o", "picked.pdf", "--order", "click"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    assert_eq!(
        labels(&dir.path().join("picked.pdf")),
        vec!["Page 4", "Page 1", "Page 3"]
    );
}

#[test]
fn extract_range_clicks() {
    let dir = tempfile::tempdir().unwrap();
    write_sample(dir.path(), "Scan.PDF", 10);

    let output = pdfpick(dir.path())
        .args(["cat", "Scan.PDF", "2 +5 2"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    assert_eq!(
        labels(&dir.path().join("Scan-extracted.pdf")),
        vec!["Page 3", "Page 4", "Page 5"]
    );
}

#[test]
fn invalid_document_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.pdf"), b"this is not a pdf").unwrap();

    let output = pdfpick(dir.path())
        .args(["extract", "broken.pdf", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid PDF document"), "{}", stderr);
    assert!(!dir.path().join("broken-extracted.pdf").exists());
}

#[test]
fn out_of_range_click_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_sample(dir.path(), "book.pdf", 3);

    let output = pdfpick(dir.path())
        .args(["extract", "book.pdf", "2-9"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("book-extracted.pdf").exists());
}

#[test]
fn non_pdf_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample(dir.path(), "book.pdf", 2);
    std::fs::copy(&pdf, dir.path().join("book.txt")).unwrap();

    let output = pdfpick(dir.path())
        .args(["extract", "book.txt", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a PDF file"), "{}", stderr);
}

#[test]
fn interactive_session_selects_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    write_sample(dir.path(), "book.pdf", 10);

    let output = pdfpick(dir.path())
        .args(["select", "book.pdf"])
        .write_stdin("2\n+5\n2\nexport\nquit\n")
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Loaded book.pdf (10 pages)"), "{}", stdout);
    assert!(stdout.contains("4 of 10 pages selected: 2,3,4,5"), "{}", stdout);
    assert!(stdout.contains("3 of 10 pages selected: 3,4,5"), "{}", stdout);
    assert!(stdout.contains("Saved 3 page(s)"), "{}", stdout);

    assert_eq!(
        labels(&dir.path().join("book-extracted.pdf")),
        vec!["Page 3", "Page 4", "Page 5"]
    );
}

#[test]
fn interactive_session_reports_errors_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    write_sample(dir.path(), "first.pdf", 4);
    write_sample(dir.path(), "second.pdf", 3);
    std::fs::write(dir.path().join("bad.pdf"), b"garbage").unwrap();

    let script = "\
export
1-4
load bad.pdf
3
load second.pdf
export
+2
3
export out.pdf
quit
";
    let output = pdfpick(dir.path())
        .args(["select", "first.pdf"])
        .write_stdin(script)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error: no pages selected"), "{}", stdout);
    assert!(stdout.contains("Error: Failed to open PDF: bad.pdf"), "{}", stdout);
    assert!(stdout.contains("Error: no document loaded"), "{}", stdout);
    assert!(stdout.contains("Saved 2 page(s) to out.pdf"), "{}", stdout);

    assert!(!dir.path().join("first-extracted.pdf").exists());
    assert_eq!(labels(&dir.path().join("out.pdf")), vec!["Page 2", "Page 3"]);
}
