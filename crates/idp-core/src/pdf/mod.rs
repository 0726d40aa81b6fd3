//! PDF rasterization collaborator boundary.

use image::DynamicImage;

use crate::error::Result;

/// Trait for PDF page renderers.
///
/// Pages are numbered from 1.
pub trait PageRasterizer {
    /// Get the number of pages in the PDF.
    fn page_count(&self, pdf: &[u8]) -> Result<u32>;

    /// Render a page as an image at the specified DPI.
    fn render_page(&self, pdf: &[u8], page: u32, dpi: u32) -> Result<DynamicImage>;
}
