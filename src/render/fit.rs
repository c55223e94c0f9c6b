/*!
 * Font-size fitting.
 *
 * Starts at the size the box suggests, wraps the text at word boundaries and
 * shrinks in fixed steps until the block fits. At the floor size the text is
 * drawn anyway and the result is flagged as overflowing.
 */

use serde::{Deserialize, Serialize};

use super::metrics::FontMetrics;
use crate::layout::Rect;

/// Sizing knobs for the fitting loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub font_step: f64,
    /// Line height as a multiple of the font size
    pub line_spacing: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_font_size: 4.0,
            max_font_size: 12.0,
            font_step: 0.5,
            line_spacing: 1.2,
        }
    }
}

/// Text laid out inside a box
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub font_size: f64,
    pub lines: Vec<String>,
    /// Widest line at `font_size`
    pub width: f64,
    /// Height of the whole block at `font_size`
    pub height: f64,
    /// The floor size was reached and the block still exceeds the box
    pub overflow: bool,
}

impl FittedText {
    /// Box actually covered by the lines when drawn from the top-left of `rect`
    pub fn text_bbox(&self, rect: &Rect) -> Rect {
        Rect::new(rect.x0, rect.y0, rect.x0 + self.width, rect.y0 + self.height)
    }
}

/// Greedy word wrap against `max_width` points. Explicit newlines are kept.
/// A single word wider than the box stays on its own line.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64, metrics: &dyn FontMetrics) -> Vec<String> {
    let space = metrics.text_width(" ", font_size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = metrics.text_width(word, font_size);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

fn layout_at(
    text: &str,
    rect: &Rect,
    font_size: f64,
    options: &FitOptions,
    metrics: &dyn FontMetrics,
) -> FittedText {
    let lines = wrap_text(text, rect.width(), font_size, metrics);
    let width = lines
        .iter()
        .map(|line| metrics.text_width(line, font_size))
        .fold(0.0, f64::max);
    let height = lines.len() as f64 * font_size * options.line_spacing;
    FittedText {
        font_size,
        lines,
        width,
        height,
        overflow: false,
    }
}

/// Fit `text` into `rect`.
///
/// The starting size is `min(max_font_size, rect height * size_factor)`,
/// never below the floor.
pub fn fit_text(
    text: &str,
    rect: &Rect,
    size_factor: f64,
    options: &FitOptions,
    metrics: &dyn FontMetrics,
) -> FittedText {
    let rect = rect.normalized();
    let mut size = (rect.height() * size_factor)
        .min(options.max_font_size)
        .max(options.min_font_size);
    let step = if options.font_step > 0.0 { options.font_step } else { 0.5 };

    loop {
        let fitted = layout_at(text, &rect, size, options, metrics);
        // Small epsilon absorbs float noise on exact fits
        let fits = fitted.width <= rect.width() + 1e-6 && fitted.height <= rect.height() + 1e-6;
        if fits {
            return fitted;
        }
        if size - step < options.min_font_size {
            let mut floor = layout_at(text, &rect, options.min_font_size, options, metrics);
            floor.overflow = !(floor.width <= rect.width() + 1e-6
                && floor.height <= rect.height() + 1e-6);
            return floor;
        }
        size -= step;
    }
}
