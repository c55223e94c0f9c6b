/*!
 * Tests for output validation and terminology correction
 */

use std::collections::HashMap;

use finlate::translation::glossary::FinancialGlossary;
use finlate::translation::quality::{Rejection, TranslationValidator};

#[test]
fn test_validate_withCleanOutput_shouldAccept() {
    let validator = TranslationValidator::new(4);
    assert!(validator.validate("النقد وما في حكمه", "Cash and cash equivalents").is_ok());
    assert!(validator.validate("١٢٣", "123").is_ok());
}

#[test]
fn test_validate_withEmptyOutput_shouldReject() {
    let validator = TranslationValidator::new(4);
    assert_eq!(validator.validate("الأصول", "   "), Err(Rejection::Empty));
    // Blank in, blank out is fine
    assert!(validator.validate("  ", "").is_ok());
}

#[test]
fn test_validate_withSourceScript_shouldReject() {
    let validator = TranslationValidator::new(4);
    let result = validator.validate("الأصول", "Total الأصول");
    assert!(matches!(result, Err(Rejection::SourceScriptLeak { count: 6 })));
}

#[test]
fn test_validate_withTokenLoop_shouldReject() {
    let validator = TranslationValidator::new(4);
    assert!(validator.validate("x", "the the the").is_ok());
    assert!(matches!(
        validator.validate("x", "the the The the"),
        Err(Rejection::RepeatedToken { run: 4, .. })
    ));
}

#[test]
fn test_validate_withPhraseLoop_shouldReject() {
    let validator = TranslationValidator::new(4);
    let looping = "net profit net profit net profit for the year";
    match validator.validate("x", looping) {
        Err(Rejection::RepeatedPhrase { phrase, run }) => {
            assert_eq!(phrase, "net profit");
            assert_eq!(run, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(validator.validate("x", "net profit net profit").is_ok());
}

#[test]
fn test_validate_withLowerTokenRun_shouldBeStricter() {
    let validator = TranslationValidator::new(2);
    assert!(validator.validate("x", "cash cash").is_err());
}

#[test]
fn test_glossary_shouldCorrectLiteralRenderings() {
    let glossary = FinancialGlossary::default();
    assert_eq!(glossary.apply("Traded Assets"), "Current assets");
    assert_eq!(glossary.apply("traded assets"), "Current assets");
    assert_eq!(glossary.apply("Rasalmal"), "Capital");
    // Near-exact containment only
    assert_eq!(glossary.apply("Traded Assets:"), "Current assets:");
    assert_eq!(
        glossary.apply("The company classifies Traded Assets by maturity"),
        "The company classifies Traded Assets by maturity"
    );
}

#[test]
fn test_glossary_shouldLeaveUnknownTextUnchanged() {
    let glossary = FinancialGlossary::default();
    assert_eq!(glossary.apply("Revenue"), "Revenue");
    assert_eq!(glossary.apply("1,250"), "1,250");
    assert_eq!(glossary.apply(""), "");
}

#[test]
fn test_glossary_withExtraTerms_shouldOverrideBuiltIns() {
    let mut extra = HashMap::new();
    extra.insert("Traded Assets".to_string(), "Current Assets".to_string());
    extra.insert("Murabaha".to_string(), "Cost-plus financing".to_string());
    let glossary = FinancialGlossary::new(&extra);

    assert_eq!(glossary.apply("Traded Assets"), "Current Assets");
    assert_eq!(glossary.apply("Murabaha"), "Cost-plus financing");
    assert_eq!(glossary.len(), FinancialGlossary::default().len() + 1);
}
