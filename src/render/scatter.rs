/*!
 * Scatter phase: turn resolved translations into render operations.
 *
 * Every queue entry becomes one op: paint the original box with the cover
 * colour, then draw the translated lines at the fitted size. Ops are handed
 * to a `DocumentRenderer`, page by page in document order.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::fit::{FitOptions, fit_text};
use super::metrics::{FontMetrics, HelveticaMetrics};
use crate::layout::{PageGeometry, Rect, TableRef};
use crate::translation::pipeline::queue::{
    Route, TranslationQueue, TranslationQueueEntry, UniqueStringMap,
};

/// RGB colour painted over the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CoverColor {
    pub const WHITE: CoverColor = CoverColor { r: 255, g: 255, b: 255 };

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl Default for CoverColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for CoverColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Layout settings for the scatter phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub fit: FitOptions,
    /// Starting size as a fraction of the box height, prose spans
    pub prose_size_factor: f64,
    /// Starting size as a fraction of the box height, table cells
    pub table_size_factor: f64,
    pub cover_color: CoverColor,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            fit: FitOptions::default(),
            prose_size_factor: 0.8,
            table_size_factor: 0.7,
            cover_color: CoverColor::WHITE,
        }
    }
}

/// One cover-and-draw operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOp {
    pub page: u32,
    pub span_id: usize,
    /// Area painted with the cover colour
    pub cover: Rect,
    pub cover_color: CoverColor,
    /// Box the translated text is laid out in
    pub rect: Rect,
    pub text: String,
    pub lines: Vec<String>,
    pub font_size: f64,
    /// Area the drawn lines actually occupy
    pub text_bbox: Rect,
    pub is_table_cell: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableRef>,
    pub route: Route,
    pub overflow: bool,
}

/// Ordered render operations for a whole document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub pages: Vec<PageGeometry>,
    pub ops: Vec<RenderOp>,
}

impl RenderPlan {
    /// Ops on one page, in draw order
    pub fn ops_for_page(&self, page: u32) -> impl Iterator<Item = &RenderOp> {
        self.ops.iter().filter(move |op| op.page == page)
    }

    pub fn overflow_count(&self) -> usize {
        self.ops.iter().filter(|op| op.overflow).count()
    }
}

/// Sink for render operations. A PDF writer implements this; `RenderPlan`
/// collection is the built-in implementation.
pub trait DocumentRenderer {
    type Output;

    /// Start a page. Called once per page, in document order, before its ops
    fn begin_page(&mut self, page: &PageGeometry);

    /// Paint `op.cover`, then draw `op.lines`
    fn draw(&mut self, op: RenderOp);

    fn finish(self) -> Self::Output;
}

/// Collects ops into a `RenderPlan`
#[derive(Debug, Default)]
pub struct PlanRenderer {
    plan: RenderPlan,
}

impl PlanRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentRenderer for PlanRenderer {
    type Output = RenderPlan;

    fn begin_page(&mut self, page: &PageGeometry) {
        self.plan.pages.push(*page);
    }

    fn draw(&mut self, op: RenderOp) {
        self.plan.ops.push(op);
    }

    fn finish(self) -> RenderPlan {
        self.plan
    }
}

/// Builds render ops from the queue and the resolved strings
pub struct Scatter {
    options: LayoutOptions,
    metrics: Box<dyn FontMetrics>,
}

impl fmt::Debug for Scatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scatter").field("options", &self.options).finish()
    }
}

impl Default for Scatter {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

impl Scatter {
    pub fn new(options: LayoutOptions) -> Self {
        Self::with_metrics(options, Box::new(HelveticaMetrics))
    }

    pub fn with_metrics(options: LayoutOptions, metrics: Box<dyn FontMetrics>) -> Self {
        Self { options, metrics }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Build the op for a single entry
    pub fn op_for(&self, entry: &TranslationQueueEntry, map: &UniqueStringMap) -> RenderOp {
        let (text, route) = match map.get(&entry.original_text) {
            Some(resolved) => (resolved.translated.clone(), resolved.route),
            None => {
                warn!(
                    "No resolved value for span {} on page {}, keeping original text",
                    entry.span_id, entry.location.page
                );
                (entry.original_text.clone(), Route::Fallback)
            }
        };

        let rect = entry.location.bbox.normalized();
        let factor = if entry.location.is_table_cell {
            self.options.table_size_factor
        } else {
            self.options.prose_size_factor
        };
        let fitted = fit_text(&text, &rect, factor, &self.options.fit, self.metrics.as_ref());
        if fitted.overflow {
            debug!(
                "Span {} on page {} overflows its box at {}pt",
                entry.span_id, entry.location.page, fitted.font_size
            );
        }

        RenderOp {
            page: entry.location.page,
            span_id: entry.span_id,
            cover: rect,
            cover_color: self.options.cover_color,
            rect,
            text_bbox: fitted.text_bbox(&rect),
            text,
            lines: fitted.lines,
            font_size: fitted.font_size,
            is_table_cell: entry.location.is_table_cell,
            table: entry.location.table,
            route,
            overflow: fitted.overflow,
        }
    }

    /// Feed every page and op to `renderer` in document order
    pub fn render<R: DocumentRenderer>(
        &self,
        pages: &[PageGeometry],
        queue: &TranslationQueue,
        map: &UniqueStringMap,
        mut renderer: R,
    ) -> R::Output {
        let mut by_page: HashMap<u32, Vec<&TranslationQueueEntry>> = HashMap::new();
        for entry in queue.entries() {
            by_page.entry(entry.location.page).or_default().push(entry);
        }

        for page in pages {
            renderer.begin_page(page);
            if let Some(entries) = by_page.get(&page.number) {
                for entry in entries {
                    renderer.draw(self.op_for(entry, map));
                }
            }
        }

        renderer.finish()
    }

    /// Convenience wrapper collecting a `RenderPlan`
    pub fn plan(
        &self,
        pages: &[PageGeometry],
        queue: &TranslationQueue,
        map: &UniqueStringMap,
    ) -> RenderPlan {
        self.render(pages, queue, map, PlanRenderer::new())
    }
}
