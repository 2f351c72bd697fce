pub mod document;
pub mod render;

#[cfg(test)]
pub mod fixture;

pub use document::{extract, PdfDocument};
pub use render::{PageRasterizer, PdfiumBackend, RenderBackend};
