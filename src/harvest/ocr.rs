/*!
 * OCR fallback.
 *
 * The OCR engine itself is an external collaborator; `OcrEngine` is the seam.
 * Word boxes are filtered by confidence and grouped into line spans here.
 */

use std::cmp::Ordering;

use crate::errors::ExtractionError;
use crate::layout::{LayoutPage, OcrWord, Rect};
use crate::script_utils::has_arabic_letters;

/// Source of OCR words for a page
pub trait OcrEngine: Send + Sync {
    /// Recognise the words on `page`
    fn recognize(&self, page: &LayoutPage) -> Result<Vec<OcrWord>, ExtractionError>;
}

/// Uses the OCR words delivered with the layout document
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecomputedOcr;

impl OcrEngine for PrecomputedOcr {
    fn recognize(&self, page: &LayoutPage) -> Result<Vec<OcrWord>, ExtractionError> {
        if page.ocr_words.is_empty() {
            return Err(ExtractionError::Ocr {
                page: page.number,
                message: "no OCR words delivered for this page".to_string(),
            });
        }
        Ok(page.ocr_words.clone())
    }
}

/// A line assembled from OCR words
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub bbox: Rect,
}

/// Group words into lines.
///
/// Words below `min_confidence` are dropped. A word joins the current line
/// when its vertical centre is within `tolerance` of the line's first word.
/// Arabic lines are ordered right to left, others left to right.
pub fn group_lines(words: &[OcrWord], min_confidence: f32, tolerance: f64) -> Vec<OcrLine> {
    let mut kept: Vec<(Rect, &str)> = words
        .iter()
        .filter(|w| w.confidence >= min_confidence && !w.text.trim().is_empty())
        .map(|w| (w.bbox.normalized(), w.text.trim()))
        .collect();

    kept.sort_by(|(a, _), (b, _)| {
        let (_, ay) = a.center();
        let (_, by) = b.center();
        ay.partial_cmp(&by).unwrap_or(Ordering::Equal)
    });

    let mut groups: Vec<Vec<(Rect, &str)>> = Vec::new();
    for word in kept {
        let (_, y) = word.0.center();
        let same_line = groups
            .last()
            .is_some_and(|line| (line[0].0.center().1 - y).abs() <= tolerance);
        if same_line {
            if let Some(line) = groups.last_mut() {
                line.push(word);
            }
        } else {
            groups.push(vec![word]);
        }
    }

    groups
        .into_iter()
        .map(|mut line| {
            let right_to_left = line.iter().any(|(_, text)| has_arabic_letters(text));
            line.sort_by(|(a, _), (b, _)| {
                let order = a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal);
                if right_to_left { order.reverse() } else { order }
            });

            let bbox = line
                .iter()
                .skip(1)
                .fold(line[0].0, |acc, (rect, _)| acc.union(rect));
            let text = line
                .iter()
                .map(|(_, text)| *text)
                .collect::<Vec<_>>()
                .join(" ");
            OcrLine { text, bbox }
        })
        .collect()
}
