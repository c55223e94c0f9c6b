use anyhow::{Result, anyhow};
use isolang::Language;

// @module: Language code handling for the translation direction
// Only the language codes are free configuration. The leakage checks are
// built around the Arabic script, so the source language has to be written in it.

/// ISO 639-3 codes of languages written in the Arabic script that the
/// normaliser and leakage detector handle.
const ARABIC_SCRIPT_LANGUAGES: &[&str] = &["ara", "fas", "urd", "pus", "kur", "snd", "uig"];

/// Resolve a 2- or 3-letter ISO 639 code to an `isolang::Language`.
pub fn resolve_language(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();
    let lang = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized).or_else(|| match normalized.as_str() {
            // ISO 639-2/B codes that differ from 639-3
            "per" => Language::from_639_3("fas"),
            _ => None,
        }),
        _ => None,
    };
    lang.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// English name of the language behind `code`.
pub fn get_language_name(code: &str) -> Result<String> {
    Ok(resolve_language(code)?.to_name().to_string())
}

/// Whether `code` names a language written in the Arabic script.
pub fn is_arabic_script_language(code: &str) -> bool {
    resolve_language(code)
        .map(|lang| ARABIC_SCRIPT_LANGUAGES.contains(&lang.to_639_3()))
        .unwrap_or(false)
}

/// Check that a source/target pair is one this pipeline can process.
pub fn ensure_supported_pair(source: &str, target: &str) -> Result<()> {
    let source_lang = resolve_language(source)?;
    let target_lang = resolve_language(target)?;

    if !is_arabic_script_language(source) {
        return Err(anyhow!(
            "Source language {} is not written in the Arabic script",
            source_lang.to_name()
        ));
    }
    if source_lang == target_lang {
        return Err(anyhow!(
            "Source and target language are both {}",
            source_lang.to_name()
        ));
    }
    Ok(())
}
