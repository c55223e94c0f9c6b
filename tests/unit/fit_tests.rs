/*!
 * Tests for font fitting and layout containment
 */

use finlate::layout::Rect;
use finlate::render::{FitOptions, FontMetrics, HelveticaMetrics, fit_text};

/// Fixed-width metrics for predictable wrapping
struct MonoMetrics;

impl FontMetrics for MonoMetrics {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * 0.5
    }
}

/// Drawn text stays inside the span rectangle unless the floor is reached
#[test]
fn test_fitText_withVariousBoxes_shouldContainTextOrFlagOverflow() {
    let texts = [
        "Assets",
        "Cash and cash equivalents",
        "Consolidated statement of profit or loss and other comprehensive income",
        "Equity attributable to shareholders of the parent company",
    ];
    let boxes = [
        Rect::new(10.0, 10.0, 100.0, 30.0),
        Rect::new(0.0, 0.0, 60.0, 12.0),
        Rect::new(50.0, 700.0, 545.0, 760.0),
        Rect::new(0.0, 0.0, 25.0, 6.0),
    ];
    let options = FitOptions::default();

    for text in texts {
        for rect in &boxes {
            for factor in [0.8, 0.7] {
                let fitted = fit_text(text, rect, factor, &options, &HelveticaMetrics);
                assert!(fitted.font_size >= options.min_font_size);
                assert!(fitted.font_size <= options.max_font_size);
                if fitted.overflow {
                    assert_eq!(fitted.font_size, options.min_font_size);
                } else {
                    assert!(
                        rect.contains_rect(&fitted.text_bbox(rect), 1e-6),
                        "{:?} escapes {:?}",
                        text,
                        rect
                    );
                }
            }
        }
    }
}

/// Shrinking happens in fixed steps from the starting size
#[test]
fn test_fitText_shouldShrinkInHalfPointSteps() {
    // 20 chars at 0.5 em: width = 10 * size; box 80 wide, 100 tall
    let rect = Rect::new(0.0, 0.0, 80.0, 100.0);
    let fitted = fit_text("aaaaaaaaaaaaaaaaaaaa", &rect, 0.8, &FitOptions::default(), &MonoMetrics);
    assert!((fitted.font_size - 8.0).abs() < 1e-9);
    assert_eq!(fitted.lines.len(), 1);
}

/// Wrapping is preferred to shrinking when lines fit vertically
#[test]
fn test_fitText_withTallBox_shouldWrapAtStartSize() {
    let rect = Rect::new(0.0, 0.0, 40.0, 100.0);
    let fitted = fit_text("aaaa bbbb cccc", &rect, 0.8, &FitOptions::default(), &MonoMetrics);
    // 12pt: each word is 24 wide, two words with a space are 54 > 40
    assert_eq!(fitted.font_size, 12.0);
    assert_eq!(fitted.lines, vec!["aaaa", "bbbb", "cccc"]);
    assert!(!fitted.overflow);
}

/// Custom bounds are honoured
#[test]
fn test_fitText_withCustomFloor_shouldStopThere() {
    let options = FitOptions {
        min_font_size: 6.0,
        ..FitOptions::default()
    };
    let rect = Rect::new(0.0, 0.0, 10.0, 5.0);
    let fitted = fit_text("Property, plant and equipment", &rect, 0.8, &options, &MonoMetrics);
    assert_eq!(fitted.font_size, 6.0);
    assert!(fitted.overflow);
}
