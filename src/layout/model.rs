/*!
 * Layout types exchanged with the extraction collaborator.
 *
 * `LayoutDocument` is what a PDF geometry/text extractor hands over: one
 * record per page with text-layer spans, detected table cells and (optional)
 * OCR words. `TextSpan` is the harvested, pipeline-internal view.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::PipelineError;

/// Axis-aligned rectangle in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle from its corners
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Centre point `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Whether all four coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Same rectangle with corners ordered so that `x0 <= x1` and `y0 <= y1`
    pub fn normalized(&self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= y && y <= self.y1
    }

    /// Whether `other` lies inside this rectangle, allowing `tolerance` on every edge
    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.y0 >= self.y0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y1 <= self.y1 + tolerance
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A whole document as delivered by the extractor
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LayoutDocument {
    /// Path or name of the original PDF, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Pages in document order
    pub pages: Vec<LayoutPage>,
}

impl LayoutDocument {
    /// Check the structure before anything is harvested.
    ///
    /// Fails on zero or duplicate page numbers, non-positive or non-finite page
    /// sizes and non-finite coordinates anywhere on a page.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut numbers = HashSet::new();
        for page in &self.pages {
            if page.number == 0 {
                return Err(PipelineError::InvalidDocument(
                    "page numbers start at 1".to_string(),
                ));
            }
            if !numbers.insert(page.number) {
                return Err(PipelineError::InvalidDocument(format!(
                    "duplicate page number {}",
                    page.number
                )));
            }
            if !(page.width.is_finite() && page.height.is_finite())
                || page.width <= 0.0
                || page.height <= 0.0
            {
                return Err(PipelineError::InvalidDocument(format!(
                    "page {} has invalid size {}x{}",
                    page.number, page.width, page.height
                )));
            }

            let rects = page
                .spans
                .iter()
                .map(|s| &s.bbox)
                .chain(page.tables.iter().flat_map(|t| t.cells.iter().map(|c| &c.bbox)))
                .chain(page.ocr_words.iter().map(|w| &w.bbox));
            for rect in rects {
                if !rect.is_finite() {
                    return Err(PipelineError::InvalidDocument(format!(
                        "page {} has a non-finite bounding box",
                        page.number
                    )));
                }
            }
        }
        Ok(())
    }

    /// Geometry of every page, in document order
    pub fn page_geometry(&self) -> Vec<PageGeometry> {
        self.pages
            .iter()
            .map(|p| PageGeometry {
                number: p.number,
                width: p.width,
                height: p.height,
            })
            .collect()
    }
}

/// One page of extractor output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutPage {
    /// Page number (1-based)
    pub number: u32,

    /// Page width in points
    pub width: f64,

    /// Page height in points
    pub height: f64,

    /// Number of raster images on the page
    #[serde(default)]
    pub image_count: u32,

    /// The text layer stores Arabic glyph runs in visual (reversed) order
    #[serde(default)]
    pub visual_order: bool,

    /// Set by the extractor when reading the text layer failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,

    /// Text-layer spans (lines or blocks) in reading order
    #[serde(default)]
    pub spans: Vec<RawSpan>,

    /// Detected table candidates
    #[serde(default)]
    pub tables: Vec<RawTable>,

    /// OCR word boxes, used only when the text layer is unusable
    #[serde(default)]
    pub ocr_words: Vec<OcrWord>,
}

impl LayoutPage {
    /// Create an empty page of the given size
    pub fn new(number: u32, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
            image_count: 0,
            visual_order: false,
            extraction_error: None,
            spans: Vec::new(),
            tables: Vec::new(),
            ocr_words: Vec::new(),
        }
    }

    /// Add a text-layer span
    pub fn with_span(mut self, text: &str, bbox: Rect) -> Self {
        self.spans.push(RawSpan { text: text.to_string(), bbox });
        self
    }

    /// Add a table candidate
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Mark the page as carrying `count` raster images
    pub fn with_images(mut self, count: u32) -> Self {
        self.image_count = count;
        self
    }

    /// Whether the text layer holds any non-blank text
    pub fn has_text_layer(&self) -> bool {
        self.spans.iter().any(|s| !s.text.trim().is_empty())
            || self
                .tables
                .iter()
                .any(|t| t.cells.iter().any(|c| !c.text.trim().is_empty()))
    }

    /// A page with no text layer and no images carries nothing to translate
    pub fn is_blank(&self) -> bool {
        !self.has_text_layer() && self.image_count == 0 && self.ocr_words.is_empty()
    }
}

/// A text-layer span as extracted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpan {
    pub text: String,
    pub bbox: Rect,
}

/// A table candidate: a grid of cells
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawTable {
    pub cells: Vec<RawCell>,
}

impl RawTable {
    /// Add a cell
    pub fn with_cell(mut self, text: &str, bbox: Rect, row: usize, col: usize) -> Self {
        self.cells.push(RawCell { text: text.to_string(), bbox, row, col });
        self
    }
}

/// One table cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCell {
    pub text: String,
    pub bbox: Rect,
    pub row: usize,
    pub col: usize,
}

/// One OCR word with its confidence (0-100)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub bbox: Rect,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    100.0
}

/// Page size as carried through to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub number: u32,
    pub width: f64,
    pub height: f64,
}

/// Where a harvested span came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanSource {
    TextLayer,
    Ocr,
}

/// Identifies the table a cell belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Table index on its page
    pub index: usize,
    pub row: usize,
    pub col: usize,
}

/// A contiguous piece of extracted text with a bounding box on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Position in harvest order
    pub id: usize,
    pub text: String,
    /// Page number (1-based)
    pub page: u32,
    pub bbox: Rect,
    pub is_table_cell: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableRef>,
    pub source: SpanSource,
}
