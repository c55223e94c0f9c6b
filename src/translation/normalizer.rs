/*!
 * Source text normalisation.
 *
 * Two entry points:
 * - `normalize_digits` is the digit-by-digit mapping applied to bypassed
 *   (numeric/symbolic) strings. It never touches anything else.
 * - `Normalizer::clean` prepares a unit for the model: NFKC, numerals,
 *   punctuation, diacritics, PDF artifacts, whitespace and split words.
 */

use unicode_normalization::UnicodeNormalization;

use crate::script_utils::ascii_digit;

/// Map a source punctuation mark to its Latin equivalent.
fn latin_punctuation(ch: char) -> Option<char> {
    match ch {
        '\u{060C}' => Some(','), // Arabic comma
        '\u{061B}' => Some(';'), // Arabic semicolon
        '\u{061F}' => Some('?'), // Arabic question mark
        '\u{066A}' => Some('%'), // Arabic percent sign
        '\u{066B}' => Some('.'), // Arabic decimal separator
        '\u{066C}' => Some(','), // Arabic thousands separator
        _ => None,
    }
}

fn is_diacritic(ch: char) -> bool {
    matches!(ch, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

const TATWEEL: char = '\u{0640}';

fn is_artifact(ch: char) -> bool {
    matches!(ch, '\u{FFFD}' | '\u{200B}' | '\u{200E}' | '\u{200F}')
}

/// Core Arabic block membership, used by the split-word repair
fn is_arabic_block(ch: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&ch)
}

fn fold_letter(ch: char) -> char {
    match ch {
        'أ' | 'إ' | 'آ' => 'ا',
        'ى' | 'ئ' => 'ي',
        'ؤ' => 'و',
        'ۀ' | 'ة' => 'ه',
        other => other,
    }
}

/// Digit-by-digit normalisation for bypassed strings.
///
/// Arabic-Indic and Persian digits become ASCII; the Arabic decimal separator,
/// thousands separator, comma and percent sign become `.` `,` `,` `%`. Any
/// other character, including digit forms not listed, passes through unchanged.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{066B}' => '.',
            '\u{066C}' | '\u{060C}' => ',',
            '\u{066A}' => '%',
            other => ascii_digit(other).unwrap_or(other),
        })
        .collect()
}

/// Map Arabic-Indic and Persian numerals to ASCII digits
pub fn normalize_numerals(text: &str) -> String {
    text.chars().map(|ch| ascii_digit(ch).unwrap_or(ch)).collect()
}

/// Map Arabic punctuation to Latin punctuation
pub fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|ch| latin_punctuation(ch).unwrap_or(ch))
        .collect()
}

/// Drop harakat, Quranic marks and tatweel
pub fn strip_diacritics(text: &str) -> String {
    text.chars()
        .filter(|&ch| !is_diacritic(ch) && ch != TATWEEL)
        .collect()
}

/// Fold hamza/alef/yeh/teh-marbuta variants onto a base letter
pub fn fold_letter_variants(text: &str) -> String {
    text.chars().map(fold_letter).collect()
}

/// Remove replacement characters, zero-width spaces and direction marks
pub fn remove_artifacts(text: &str) -> String {
    text.chars().filter(|&ch| !is_artifact(ch)).collect()
}

/// Collapse every whitespace run (including line breaks) to one space
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Re-join single Arabic letters that the extractor split off a word.
///
/// Two passes, each left to right over non-overlapping matches:
/// 1. a run of 2+ Arabic characters, whitespace, then a lone Arabic character
///    (not followed by another one) is joined: `"الاصو ل"` → `"الاصول"`;
/// 2. a lone Arabic character (not preceded by another one), whitespace, then
///    a run of 2+ Arabic characters is joined: `"ا لاصول"` → `"الاصول"`.
pub fn merge_broken_words(text: &str) -> String {
    let first = merge_trailing_letters(&text.chars().collect::<Vec<_>>());
    merge_leading_letters(&first.chars().collect::<Vec<_>>())
}

fn merge_trailing_letters(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        if !is_arabic_block(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let run_start = i;
        while i < chars.len() && is_arabic_block(chars[i]) {
            i += 1;
        }
        out.extend(&chars[run_start..i]);

        if i - run_start < 2 {
            continue;
        }

        let mut k = i;
        while k < chars.len() && chars[k].is_whitespace() {
            k += 1;
        }
        let lone = k > i
            && k < chars.len()
            && is_arabic_block(chars[k])
            && chars.get(k + 1).is_none_or(|next| !is_arabic_block(*next));
        if lone {
            out.push(chars[k]);
            i = k + 1;
        }
    }
    out
}

fn merge_leading_letters(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let preceded = i > 0 && is_arabic_block(chars[i - 1]);
        if is_arabic_block(ch) && !preceded {
            let mut k = i + 1;
            while k < chars.len() && chars[k].is_whitespace() {
                k += 1;
            }
            let mut end = k;
            while end < chars.len() && is_arabic_block(chars[end]) {
                end += 1;
            }
            if k > i + 1 && end - k >= 2 {
                out.push(ch);
                out.extend(&chars[k..end]);
                i = end;
                continue;
            }
        }
        out.push(ch);
        i += 1;
    }
    out
}

/// Full cleaning pipeline for model-bound text
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    fold_letters: bool,
}

impl Normalizer {
    /// Create a normaliser; `fold_letters` enables letter-variant folding
    pub fn new(fold_letters: bool) -> Self {
        Self { fold_letters }
    }

    /// Clean one unit for inference.
    ///
    /// NFKC first, so presentation-form glyphs become base letters before any
    /// other step looks at them.
    pub fn clean(&self, text: &str) -> String {
        let text: String = text.nfkc().collect();
        let text = normalize_numerals(&text);
        let text = normalize_punctuation(&text);
        let text = strip_diacritics(&text);
        let text = if self.fold_letters {
            fold_letter_variants(&text)
        } else {
            text
        };
        let text = remove_artifacts(&text);
        let text = collapse_whitespace(&text);
        merge_broken_words(&text).trim().to_string()
    }
}
