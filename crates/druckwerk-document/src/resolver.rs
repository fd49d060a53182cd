// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page count resolution.
//
// PDF counts are exact — read from the parsed page tree via `lopdf`. DOC and
// DOCX have no cheap structural count, so pages are estimated from file size;
// the orchestrator treats both as equally authoritative.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_core::types::{DocumentFormat, DocumentRef};

/// One estimated page per 4 KiB of doc-like payload.
const DOC_LIKE_SLAB_BYTES: u64 = 4096;

/// Resolves the page count of a staged document.
///
/// Returns the count as-is — a zero count is reported, not treated as an
/// error here; the orchestrator's zero-page guard decides what to do with it.
#[async_trait]
pub trait PageCountResolver: Send + Sync {
    async fn resolve(&self, document: &DocumentRef, format: DocumentFormat) -> Result<u32>;
}

/// Production resolver: exact counts for PDF, size-based estimate for
/// doc-like formats.
pub struct StructuralPageResolver;

#[async_trait]
impl PageCountResolver for StructuralPageResolver {
    #[instrument(skip(self, document), fields(document = %document, ?format))]
    async fn resolve(&self, document: &DocumentRef, format: DocumentFormat) -> Result<u32> {
        match format {
            DocumentFormat::Pdf => {
                // lopdf parsing is CPU-bound and synchronous — keep it off
                // the async workers.
                let path = document.path().to_path_buf();
                let count = tokio::task::spawn_blocking(move || {
                    lopdf::Document::load(&path).map(|doc| doc.get_pages().len() as u32)
                })
                .await
                .map_err(|e| DruckwerkError::Internal(format!("resolver task panicked: {e}")))?
                .map_err(|e| DruckwerkError::Resolution(format!("cannot parse PDF: {e}")))?;

                debug!(count, "PDF page count read from page tree");
                Ok(count)
            }
            DocumentFormat::DocLike => {
                let meta = tokio::fs::metadata(document.path()).await.map_err(|e| {
                    DruckwerkError::Resolution(format!("cannot stat document: {e}"))
                })?;
                let count = meta.len().div_ceil(DOC_LIKE_SLAB_BYTES) as u32;
                debug!(bytes = meta.len(), count, "doc-like page count estimated");
                Ok(count)
            }
            DocumentFormat::Unsupported => {
                warn!("resolution requested for unsupported format");
                Err(DruckwerkError::UnsupportedFormat(
                    document.to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Build a blank PDF with the given number of pages using printpdf and
    /// write it into `dir`.
    fn pdf_fixture(dir: &TempDir, name: &str, pages: usize) -> DocumentRef {
        use printpdf::{Mm, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg};

        let mut doc = PdfDocument::new("fixture");
        let blank_pages: Vec<PdfPage> = (0..pages)
            .map(|_| PdfPage::new(Mm(210.0), Mm(297.0), Vec::new()))
            .collect();
        doc.with_pages(blank_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);

        let path = dir.path().join(name);
        std::fs::write(&path, bytes).expect("write fixture");
        DocumentRef::new(path)
    }

    fn raw_fixture(dir: &TempDir, name: &str, len: usize) -> DocumentRef {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create fixture");
        file.write_all(&vec![0u8; len]).expect("write fixture");
        DocumentRef::new(path)
    }

    #[tokio::test]
    async fn pdf_count_is_exact() {
        let dir = TempDir::new().expect("tempdir");
        let doc = pdf_fixture(&dir, "three.pdf", 3);

        let count = StructuralPageResolver
            .resolve(&doc, DocumentFormat::Pdf)
            .await
            .expect("resolve");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn garbage_pdf_is_unreadable() {
        let dir = TempDir::new().expect("tempdir");
        let doc = raw_fixture(&dir, "broken.pdf", 64);

        let result = StructuralPageResolver.resolve(&doc, DocumentFormat::Pdf).await;
        assert!(matches!(result, Err(DruckwerkError::Resolution(_))));
    }

    #[tokio::test]
    async fn doc_like_estimate_rounds_up() {
        let dir = TempDir::new().expect("tempdir");
        let doc = raw_fixture(&dir, "letter.docx", 4097);

        let count = StructuralPageResolver
            .resolve(&doc, DocumentFormat::DocLike)
            .await
            .expect("resolve");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn empty_doc_like_estimates_zero_pages() {
        let dir = TempDir::new().expect("tempdir");
        let doc = raw_fixture(&dir, "empty.doc", 0);

        let count = StructuralPageResolver
            .resolve(&doc, DocumentFormat::DocLike)
            .await
            .expect("resolve");
        // Zero reaches the orchestrator, whose zero-page guard fails the job.
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn missing_doc_like_file_is_a_resolution_error() {
        let dir = TempDir::new().expect("tempdir");
        let doc = DocumentRef::new(dir.path().join("never-staged.docx"));

        let result = StructuralPageResolver
            .resolve(&doc, DocumentFormat::DocLike)
            .await;
        assert!(matches!(result, Err(DruckwerkError::Resolution(_))));
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let doc = raw_fixture(&dir, "notes.txt", 10);

        let result = StructuralPageResolver
            .resolve(&doc, DocumentFormat::Unsupported)
            .await;
        assert!(matches!(result, Err(DruckwerkError::UnsupportedFormat(_))));
    }
}
