use serde::{Deserialize, Serialize};

/// Per-document statistics artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Pages in the document
    pub pages: usize,
    /// Non-table queue entries whose text went through the model successfully
    pub text_blocks_translated: usize,
    /// Distinct tables with at least one model-translated cell
    pub tables_translated: usize,
    /// Queue entries that bypassed the model
    pub bypassed: usize,
    /// Queue entries that fell back to their original text
    pub fallbacks: usize,
    /// Distinct original strings
    pub unique_strings: usize,
    /// Model calls made for this document
    pub model_calls: usize,
    /// Units served from the translation cache
    pub cache_hits: usize,
    /// Pages harvested through OCR
    pub ocr_pages: usize,
    /// Render ops that hit the font size floor
    pub overflow_spans: usize,
    /// Wall time of the whole pipeline
    pub duration_ms: u64,
}

impl DocumentStats {
    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} pages, {} text blocks and {} tables translated, {} bypassed, {} fallbacks, \
             {} unique strings, {} model calls, {} cache hits, {} OCR pages, {} overflows in {} ms",
            self.pages,
            self.text_blocks_translated,
            self.tables_translated,
            self.bypassed,
            self.fallbacks,
            self.unique_strings,
            self.model_calls,
            self.cache_hits,
            self.ocr_pages,
            self.overflow_spans,
            self.duration_ms
        )
    }
}
