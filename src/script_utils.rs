/*!
 * Arabic script detection and digit mapping.
 *
 * The leakage check has to cover every block the extractor can emit, not just
 * the core Arabic block: PDFs frequently carry presentation-form glyphs
 * (U+FB50..U+FDFF, U+FE70..U+FEFF) and Extended Arabic-Indic numerals.
 */

/// Inclusive code point ranges treated as source-script content.
pub const SOURCE_SCRIPT_RANGES: &[(u32, u32)] = &[
    (0x0600, 0x06FF), // Arabic (includes Arabic-Indic and Extended Arabic-Indic digits)
    (0x0750, 0x077F), // Arabic Supplement
    (0x08A0, 0x08FF), // Arabic Extended-A
    (0xFB50, 0xFDFF), // Arabic Presentation Forms-A
    (0xFE70, 0xFEFF), // Arabic Presentation Forms-B
];

/// Letter ranges only: excludes digits, punctuation, tatweel and diacritics.
const ARABIC_LETTER_RANGES: &[(u32, u32)] = &[
    (0x0621, 0x063A),
    (0x0641, 0x064A),
    (0x0671, 0x06D3),
    (0x06FA, 0x06FC),
    (0x0750, 0x077F),
    (0x08A0, 0x08C9),
    (0xFB50, 0xFDFF),
    (0xFE70, 0xFEFC),
];

fn in_ranges(ch: char, ranges: &[(u32, u32)]) -> bool {
    let cp = ch as u32;
    ranges.iter().any(|&(lo, hi)| lo <= cp && cp <= hi)
}

/// Whether `ch` lies in any source-script block.
pub fn is_source_script_char(ch: char) -> bool {
    in_ranges(ch, SOURCE_SCRIPT_RANGES)
}

/// Whether `text` still contains any source-script character.
pub fn contains_source_script(text: &str) -> bool {
    text.chars().any(is_source_script_char)
}

/// Number of source-script characters in `text`.
pub fn count_source_script(text: &str) -> usize {
    text.chars().filter(|c| is_source_script_char(*c)).count()
}

/// Whether `ch` is an Arabic letter (base or presentation form).
pub fn is_arabic_letter(ch: char) -> bool {
    in_ranges(ch, ARABIC_LETTER_RANGES)
}

/// Whether `text` contains at least one Arabic letter.
pub fn has_arabic_letters(text: &str) -> bool {
    text.chars().any(is_arabic_letter)
}

/// Map a non-Latin decimal digit to its ASCII equivalent.
///
/// Covers Arabic-Indic (U+0660..U+0669) and Extended Arabic-Indic / Persian
/// (U+06F0..U+06F9) digits. Anything else returns `None`.
pub fn ascii_digit(ch: char) -> Option<char> {
    let cp = ch as u32;
    let offset = match cp {
        0x0660..=0x0669 => cp - 0x0660,
        0x06F0..=0x06F9 => cp - 0x06F0,
        _ => return None,
    };
    char::from_digit(offset, 10)
}

/// Whether `ch` is any digit the normaliser understands (ASCII or Arabic forms).
pub fn is_known_digit(ch: char) -> bool {
    ch.is_ascii_digit() || ascii_digit(ch).is_some()
}

/// Whether `text` contains any digit, ASCII or Arabic.
pub fn has_any_digit(text: &str) -> bool {
    text.chars().any(is_known_digit)
}

/// Bidi controls and zero-width marks that extractors leave in otherwise empty runs.
pub fn is_invisible_mark(ch: char) -> bool {
    matches!(
        ch,
        '\u{061C}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
    )
}

/// Whether `text` has at least one character that would be drawn.
pub fn has_visible_text(text: &str) -> bool {
    text.chars().any(|c| !c.is_whitespace() && !is_invisible_mark(c))
}
