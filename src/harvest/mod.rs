/*!
 * Harvester: layout document → ordered text spans.
 *
 * Per page the text layer is preferred. OCR is used when the extractor
 * reported a failure for the page, when the page has raster content but an
 * empty text layer, or when the text layer of a non-blank page produced no
 * spans at all. Table candidates go through the density classifier; prose
 * spans that sit inside a non-empty table cell are dropped so each glyph run
 * is harvested once.
 */

pub mod ocr;
pub mod tables;

use log::{debug, info, warn};

use crate::errors::PipelineError;
use crate::layout::{LayoutDocument, LayoutPage, PageGeometry, Rect, SpanSource, TableRef, TextSpan};
use crate::script_utils::{contains_source_script, has_any_digit, has_visible_text};

pub use ocr::{OcrEngine, OcrLine, PrecomputedOcr, group_lines};
pub use tables::{TableClassifier, TableDensity, TableKind};

/// Harvester settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarvestOptions {
    /// OCR words below this confidence (0-100) are dropped
    pub min_ocr_confidence: f32,
    /// Vertical distance within which OCR words share a line
    pub ocr_line_tolerance: f64,
    pub table_classifier: TableClassifier,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            min_ocr_confidence: 30.0,
            ocr_line_tolerance: 10.0,
            table_classifier: TableClassifier::default(),
        }
    }
}

/// Output of the harvest phase
#[derive(Debug, Clone, Default)]
pub struct HarvestResult {
    /// Spans in document order
    pub spans: Vec<TextSpan>,
    pub pages: Vec<PageGeometry>,
    /// Pages harvested through OCR
    pub ocr_pages: usize,
}

/// Reverse each Arabic token stored in visual order.
///
/// Tokens carrying digits keep their order: numbers are stored left to right
/// even in visual-order text layers.
pub fn fix_visual_order(text: &str) -> String {
    text.split(' ')
        .map(|token| {
            if contains_source_script(token) && !has_any_digit(token) {
                token.chars().rev().collect()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Walks a layout document and produces text spans
pub struct Harvester {
    options: HarvestOptions,
    ocr: Box<dyn OcrEngine>,
}

impl Harvester {
    pub fn new(options: HarvestOptions, ocr: Box<dyn OcrEngine>) -> Self {
        Self { options, ocr }
    }

    /// Harvester using OCR words delivered with the document
    pub fn with_options(options: HarvestOptions) -> Self {
        Self::new(options, Box::new(PrecomputedOcr))
    }

    /// Harvest every page.
    ///
    /// Only structural corruption is an error; a page whose OCR fails simply
    /// contributes no spans.
    pub fn harvest(&self, document: &LayoutDocument) -> Result<HarvestResult, PipelineError> {
        document.validate()?;

        let mut result = HarvestResult {
            pages: document.page_geometry(),
            ..Default::default()
        };

        for page in &document.pages {
            let before = result.spans.len();
            if self.needs_ocr(page) {
                result.ocr_pages += 1;
                self.harvest_ocr(page, &mut result.spans);
            } else {
                self.harvest_text_layer(page, &mut result.spans);
                if result.spans.len() == before && !page.is_blank() {
                    warn!(
                        "Page {}: text layer produced no spans; treating it as image-only",
                        page.number
                    );
                    result.ocr_pages += 1;
                    self.harvest_ocr(page, &mut result.spans);
                }
            }
            debug!(
                "Page {}: {} spans",
                page.number,
                result.spans.len() - before
            );
        }

        info!(
            "Harvested {} spans from {} pages ({} via OCR)",
            result.spans.len(),
            result.pages.len(),
            result.ocr_pages
        );
        Ok(result)
    }

    fn needs_ocr(&self, page: &LayoutPage) -> bool {
        if let Some(error) = &page.extraction_error {
            warn!(
                "Text extraction failed on page {}: {}; falling back to OCR",
                page.number, error
            );
            return true;
        }
        !page.has_text_layer() && !page.is_blank()
    }

    fn harvest_ocr(&self, page: &LayoutPage, spans: &mut Vec<TextSpan>) {
        let words = match self.ocr.recognize(page) {
            Ok(words) => words,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };

        for line in group_lines(
            &words,
            self.options.min_ocr_confidence,
            self.options.ocr_line_tolerance,
        ) {
            push_span(spans, page.number, &line.text, line.bbox, None, SpanSource::Ocr);
        }
    }

    fn harvest_text_layer(&self, page: &LayoutPage, spans: &mut Vec<TextSpan>) {
        let fix = |text: &str| {
            if page.visual_order {
                fix_visual_order(text)
            } else {
                text.to_string()
            }
        };

        let mut table_cells: Vec<(String, Rect, TableRef)> = Vec::new();
        let mut prose: Vec<(String, Rect)> = Vec::new();

        for span in &page.spans {
            prose.push((fix(&span.text), span.bbox.normalized()));
        }

        for (index, table) in page.tables.iter().enumerate() {
            match self.options.table_classifier.classify(table) {
                TableKind::Table => {
                    for cell in table.cells.iter().filter(|c| has_visible_text(&c.text)) {
                        table_cells.push((
                            fix(&cell.text),
                            cell.bbox.normalized(),
                            TableRef {
                                index,
                                row: cell.row,
                                col: cell.col,
                            },
                        ));
                    }
                }
                TableKind::Prose => {
                    debug!(
                        "Page {}: table candidate {} reclassified as prose",
                        page.number, index
                    );
                    for cell in &table.cells {
                        prose.push((fix(&cell.text), cell.bbox.normalized()));
                    }
                }
            }
        }

        let in_table = |rect: &Rect| {
            let (x, y) = rect.center();
            table_cells
                .iter()
                .any(|(_, cell, _)| cell.contains_point(x, y))
        };

        for (text, bbox) in &prose {
            if in_table(bbox) {
                continue;
            }
            push_span(spans, page.number, text, *bbox, None, SpanSource::TextLayer);
        }
        for (text, bbox, table) in &table_cells {
            push_span(
                spans,
                page.number,
                text,
                *bbox,
                Some(*table),
                SpanSource::TextLayer,
            );
        }
    }
}

impl Default for Harvester {
    fn default() -> Self {
        Self::with_options(HarvestOptions::default())
    }
}

fn push_span(
    spans: &mut Vec<TextSpan>,
    page: u32,
    text: &str,
    bbox: Rect,
    table: Option<TableRef>,
    source: SpanSource,
) {
    let text = text.trim();
    if !has_visible_text(text) {
        return;
    }
    spans.push(TextSpan {
        id: spans.len(),
        text: text.to_string(),
        page,
        bbox,
        is_table_cell: table.is_some(),
        table,
        source,
    });
}
