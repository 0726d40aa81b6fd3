//! Multi-page document processing over the OCR and PDF collaborators.

use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CollaboratorError, Result};
use crate::extraction::DocumentExtractor;
use crate::models::config::IdpConfig;
use crate::models::document::ExtractionResult;
use crate::ocr::{OcrBackend, OcrLine, OcrOptions};
use crate::pdf::PageRasterizer;

/// Extraction output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// Page number, starting at 1.
    pub page: u32,

    /// OCR lines recognized on the page.
    pub lines: Vec<OcrLine>,

    /// Extraction over this page alone.
    pub result: ExtractionResult,
}

/// Extraction output for a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Per-page results, in page order.
    pub pages: Vec<PageReport>,

    /// Extraction over the lines of all pages; field line indices count
    /// across pages.
    pub overall: ExtractionResult,
}

impl DocumentReport {
    fn from_pages(pages: Vec<PageReport>, extractor: &DocumentExtractor) -> Self {
        let lines: Vec<OcrLine> = pages.iter().flat_map(|p| p.lines.iter().cloned()).collect();
        let overall = extractor.run(&lines);
        Self { pages, overall }
    }
}

/// Drives OCR and rasterization, then extraction, for images and PDFs.
pub struct DocumentProcessor<O: OcrBackend, R: PageRasterizer> {
    ocr: O,
    rasterizer: R,
    extractor: DocumentExtractor,
    options: OcrOptions,
    render_dpi: u32,
    max_pages: u32,
}

impl<O: OcrBackend, R: PageRasterizer> DocumentProcessor<O, R> {
    /// Create a processor from collaborators and configuration.
    pub fn new(ocr: O, rasterizer: R, config: &IdpConfig) -> Self {
        Self {
            ocr,
            rasterizer,
            extractor: DocumentExtractor::from_config(config),
            options: OcrOptions::from(&config.ocr),
            render_dpi: config.pdf.render_dpi,
            max_pages: config.pdf.max_pages,
        }
    }

    /// Process a single image as a one-page document.
    pub fn process_image(&self, image: &DynamicImage) -> Result<DocumentReport> {
        let page = self.process_page(1, image)?;
        Ok(DocumentReport::from_pages(vec![page], &self.extractor))
    }

    /// Process up to `max_pages` pages of a PDF.
    pub fn process_pdf(&self, pdf: &[u8]) -> Result<DocumentReport> {
        let start = Instant::now();
        let count = self.rasterizer.page_count(pdf)?;
        if count == 0 {
            return Err(CollaboratorError::NoPages.into());
        }

        let last = count.min(self.max_pages);
        if last < count {
            info!("PDF has {} pages, processing first {}", count, last);
        }

        let mut pages = Vec::with_capacity(last as usize);
        for page in 1..=last {
            let image = self.rasterizer.render_page(pdf, page, self.render_dpi)?;
            pages.push(self.process_page(page, &image)?);
        }

        let report = DocumentReport::from_pages(pages, &self.extractor);
        info!(
            "Processed {} pages as {} in {}ms",
            report.pages.len(),
            report.overall.document_type,
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    fn process_page(&self, page: u32, image: &DynamicImage) -> Result<PageReport> {
        let lines = self.ocr.recognize(image, &self.options)?;
        debug!("Page {}: {} OCR lines", page, lines.len());
        let result = self.extractor.run(&lines);
        Ok(PageReport {
            page,
            lines,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdpError;
    use crate::models::document::DocumentType;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Returns one canned page of lines per call, in order.
    struct FakeOcr {
        pages: Vec<Vec<&'static str>>,
        calls: RefCell<usize>,
        seen: RefCell<Vec<OcrOptions>>,
    }

    impl FakeOcr {
        fn new(pages: Vec<Vec<&'static str>>) -> Self {
            Self {
                pages,
                calls: RefCell::new(0),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl OcrBackend for FakeOcr {
        fn recognize(&self, _image: &DynamicImage, options: &OcrOptions) -> Result<Vec<OcrLine>> {
            let mut calls = self.calls.borrow_mut();
            self.seen.borrow_mut().push(*options);
            let page = self
                .pages
                .get(*calls)
                .ok_or_else(|| CollaboratorError::Ocr("no more pages".to_string()))?;
            *calls += 1;
            Ok(page.iter().map(|t| OcrLine::new(*t, 0.9)).collect())
        }
    }

    struct FakePdf {
        pages: u32,
        rendered: RefCell<Vec<(u32, u32)>>,
        fail_on: Option<u32>,
    }

    impl FakePdf {
        fn new(pages: u32) -> Self {
            Self {
                pages,
                rendered: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    impl PageRasterizer for FakePdf {
        fn page_count(&self, _pdf: &[u8]) -> Result<u32> {
            Ok(self.pages)
        }

        fn render_page(&self, _pdf: &[u8], page: u32, dpi: u32) -> Result<DynamicImage> {
            if self.fail_on == Some(page) {
                return Err(CollaboratorError::Render {
                    page,
                    reason: "corrupt stream".to_string(),
                }
                .into());
            }
            self.rendered.borrow_mut().push((page, dpi));
            Ok(DynamicImage::new_rgb8(1, 1))
        }
    }

    #[test]
    fn test_process_image() {
        let ocr = FakeOcr::new(vec![vec!["INVOICE #1234", "Date: 2024-01-15", "Total: $250.00"]]);
        let processor = DocumentProcessor::new(ocr, FakePdf::new(0), &IdpConfig::default());

        let report = processor.process_image(&DynamicImage::new_rgb8(1, 1)).unwrap();
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].page, 1);
        assert_eq!(report.pages[0].result, report.overall);
        assert_eq!(report.overall.document_type, DocumentType::Invoice);
        assert_eq!(report.overall.first_value("date"), Some("2024-01-15"));
    }

    #[test]
    fn test_process_pdf_aggregates_pages() {
        let ocr = FakeOcr::new(vec![
            vec!["INVOICE #1234", "Invoice Date: 15/01/2024"],
            vec!["Amount Due: USD 250.00", "billing@example.com"],
        ]);
        let processor = DocumentProcessor::new(ocr, FakePdf::new(2), &IdpConfig::default());

        let report = processor.process_pdf(b"%PDF").unwrap();
        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.pages[1].page, 2);

        let overall = &report.overall;
        assert_eq!(overall.document_type, DocumentType::Invoice);
        assert_eq!(overall.first_value("invoice_date"), Some("2024-01-15"));

        // Line indices run across pages.
        let email = overall.fields_named("email").next().unwrap();
        assert_eq!(email.line, 3);
        assert_eq!(report.pages[1].result.fields_named("email").next().unwrap().line, 1);
    }

    #[test]
    fn test_process_pdf_respects_limits() {
        let mut config = IdpConfig::default();
        config.pdf.max_pages = 2;
        config.pdf.render_dpi = 150;
        config.ocr.deskew = true;

        let ocr = FakeOcr::new(vec![vec!["one"], vec!["two"], vec!["three"]]);
        let processor = DocumentProcessor::new(ocr, FakePdf::new(3), &config);
        let report = processor.process_pdf(b"%PDF").unwrap();

        assert_eq!(report.pages.len(), 2);
        assert_eq!(*processor.rasterizer.rendered.borrow(), vec![(1, 150), (2, 150)]);
        assert!(processor.ocr.seen.borrow().iter().all(|o| o.deskew && o.preprocess));
        assert_eq!(report.overall.text, "one\ntwo");
    }

    #[test]
    fn test_empty_pdf_is_error() {
        let processor = DocumentProcessor::new(FakeOcr::new(vec![]), FakePdf::new(0), &IdpConfig::default());
        assert!(matches!(
            processor.process_pdf(b""),
            Err(IdpError::Collaborator(CollaboratorError::NoPages))
        ));
    }

    #[test]
    fn test_collaborator_errors_propagate() {
        let mut rasterizer = FakePdf::new(2);
        rasterizer.fail_on = Some(2);
        let ocr = FakeOcr::new(vec![vec!["a"], vec!["b"]]);
        let processor = DocumentProcessor::new(ocr, rasterizer, &IdpConfig::default());
        assert!(matches!(
            processor.process_pdf(b"%PDF"),
            Err(IdpError::Collaborator(CollaboratorError::Render { page: 2, .. }))
        ));

        let processor = DocumentProcessor::new(FakeOcr::new(vec![]), FakePdf::new(1), &IdpConfig::default());
        assert!(matches!(
            processor.process_image(&DynamicImage::new_rgb8(1, 1)),
            Err(IdpError::Collaborator(CollaboratorError::Ocr(_)))
        ));
    }

    #[test]
    fn test_blank_pages() {
        let ocr = FakeOcr::new(vec![vec!["   "]]);
        let processor = DocumentProcessor::new(ocr, FakePdf::new(1), &IdpConfig::default());
        let report = processor.process_pdf(b"%PDF").unwrap();
        assert_eq!(report.overall, ExtractionResult::empty());
    }
}
