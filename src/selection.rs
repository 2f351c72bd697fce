//! Page selection state: the set of selected pages plus the range anchor.

use indexmap::IndexSet;

/// Order in which selected pages are handed to extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportOrder {
    /// Ascending page order, i.e. reading order of the source document.
    #[default]
    Document,
    /// The order in which pages entered the selection.
    Click,
}

/// Selected pages (1-based) and the anchor for range clicks.
///
/// Insertion order is retained so that [`ExportOrder::Click`] can be honoured;
/// membership is all that matters for every other operation.
#[derive(Debug, Clone)]
pub struct Selection {
    selected: IndexSet<u32>,
    anchor: Option<u32>,
    total_pages: u32,
}

impl Selection {
    pub fn new(total_pages: u32) -> Self {
        Selection {
            selected: IndexSet::new(),
            anchor: None,
            total_pages,
        }
    }

    /// Apply one click on `page`.
    ///
    /// With `extend_range` set and an anchor present, every page between the
    /// anchor and `page` (inclusive) is added and the anchor stays put. Any
    /// other click flips membership of `page` and makes it the new anchor.
    ///
    /// `page` must lie in `1..=total_pages`.
    pub fn toggle(&mut self, page: u32, extend_range: bool) {
        debug_assert!(
            (1..=self.total_pages).contains(&page),
            "page {} outside 1..={}",
            page,
            self.total_pages
        );

        match self.anchor {
            Some(anchor) if extend_range => {
                let (lo, hi) = (anchor.min(page), anchor.max(page));
                self.selected.extend(lo..=hi);
            }
            _ => {
                if !self.selected.shift_remove(&page) {
                    self.selected.insert(page);
                }
                self.anchor = Some(page);
            }
        }
    }

    pub fn contains(&self, page: u32) -> bool {
        self.selected.contains(&page)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<u32> {
        self.anchor
    }

    /// Selected pages as an export list.
    pub fn pages(&self, order: ExportOrder) -> Vec<u32> {
        let mut pages: Vec<u32> = self.selected.iter().copied().collect();
        if order == ExportOrder::Document {
            pages.sort_unstable();
        }
        pages
    }
}
