/*!
 * Tests for bypass routing and numeral normalisation
 */

use finlate::translation::normalizer::{Normalizer, normalize_digits};
use finlate::translation::router::{Classification, Router};

/// Test the numeral round trip on both Arabic digit blocks
#[test]
fn test_normalizeDigits_withArabicIndicAndPersian_shouldMapToAscii() {
    assert_eq!(normalize_digits("١٢٣٤"), "1234");
    assert_eq!(normalize_digits("۱۲۳۴"), "1234");
    assert_eq!(normalize_digits("١٬٢٥٠٫٥٠"), "1,250.50");
    assert_eq!(normalize_digits("١٥٪"), "15%");
}

/// Unknown digit forms pass through unchanged
#[test]
fn test_normalizeDigits_withUnlistedDigitForm_shouldKeepCharacter() {
    // Devanagari digits are numeric but not mapped
    assert_eq!(normalize_digits("१२"), "१२");
}

/// Whitelisted strings are bypassed with the normalised value
#[test]
fn test_classify_withNumericStrings_shouldBypass() {
    let router = Router::default();
    let cases = [
        ("١٢٣", "123"),
        ("(١٬٠٠٠)", "(1,000)"),
        ("$ 2,500.75", "$ 2,500.75"),
        ("٢٠٢٣ - ٢٠٢٢", "2023 - 2022"),
        ("-", "-"),
        ("", ""),
    ];
    for (input, expected) in cases {
        assert_eq!(
            router.classify(input),
            Classification::Bypass(expected.to_string()),
            "input {:?}",
            input
        );
    }
}

/// Anything with letters goes to the model, including mixed strings
#[test]
fn test_classify_withLetters_shouldNeedTranslation() {
    let router = Router::default();
    for input in ["الأصول", "إيضاح ٥", "Note 5", "ريال ١٠٠"] {
        assert_eq!(
            router.classify(input),
            Classification::NeedsTranslation(input.to_string())
        );
    }
}

/// The whitelist is configuration data
#[test]
fn test_new_withCustomPattern_shouldUseIt() {
    let router = Router::new(r"^[0-9]+$").unwrap();
    assert!(router.is_bypass("123"));
    assert!(!router.is_bypass("(123)"));
    assert!(Router::new("^[").is_err());
}

/// Cleaning before inference
#[test]
fn test_clean_shouldNormaliseModelInput() {
    let normalizer = Normalizer::new(false);
    assert_eq!(normalizer.clean("صافي  الربح\u{200F} لعام ٢٠٢٣"), "صافي الربح لعام 2023");
    assert_eq!(normalizer.clean("الأُصُول"), "الأصول");
    assert_eq!(normalizer.clean("ﻻ"), "لا");
}

/// Letter folding is opt-in
#[test]
fn test_clean_withFolding_shouldFoldLetterVariants() {
    assert_eq!(Normalizer::new(true).clean("الأصول"), "الاصول");
    assert_eq!(Normalizer::new(false).clean("الأصول"), "الأصول");
}
