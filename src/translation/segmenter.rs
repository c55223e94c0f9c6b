/*!
 * Sentence segmentation for model input.
 *
 * The model degrades on long inputs, so each string is cut into units: first
 * at line breaks (kept for the rejoin), then after sentence-final punctuation,
 * then at word boundaries if a unit is still longer than the limit.
 */

/// Characters that end a sentence
const TERMINATORS: &[char] = &['.', '!', '?', '\u{061F}', '\u{061B}'];

/// A string cut into translation units, line by line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedText {
    /// Units per source line; a blank line has no units
    pub lines: Vec<Vec<String>>,
}

impl SegmentedText {
    /// All units in order
    pub fn units(&self) -> impl Iterator<Item = &String> {
        self.lines.iter().flatten()
    }

    /// Rebuild a string from one output per unit, in `units()` order
    ///
    /// Units of a line are joined with a space, lines with `\n`.
    pub fn rejoin<'a, I>(&self, outputs: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut outputs = outputs.into_iter();
        self.lines
            .iter()
            .map(|line| {
                line.iter()
                    .filter_map(|_| outputs.next())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Splits text into bounded units
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    max_unit_chars: usize,
}

impl Segmenter {
    pub fn new(max_unit_chars: usize) -> Self {
        Self {
            max_unit_chars: max_unit_chars.max(1),
        }
    }

    /// Segment one string
    pub fn segment(&self, text: &str) -> SegmentedText {
        let lines = text
            .lines()
            .map(|line| {
                split_sentences(line)
                    .into_iter()
                    .flat_map(|sentence| self.split_long(&sentence))
                    .collect()
            })
            .collect();
        SegmentedText { lines }
    }

    fn split_long(&self, sentence: &str) -> Vec<String> {
        if sentence.chars().count() <= self.max_unit_chars {
            return vec![sentence.to_string()];
        }

        let mut units = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for word in sentence.split_whitespace() {
            let word_len = word.chars().count();
            let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };

            if needed > self.max_unit_chars && !current.is_empty() {
                units.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if word_len > self.max_unit_chars {
                // No word boundary to cut at
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(self.max_unit_chars) {
                    units.push(chunk.iter().collect());
                }
                continue;
            }

            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }

        if !current.is_empty() {
            units.push(current);
        }
        units
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(400)
    }
}

/// Split a line after each terminator that ends the line or precedes whitespace.
///
/// A `.` between digits (`1.5`) is not a boundary.
fn split_sentences(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, ch) in chars.iter().enumerate() {
        if !TERMINATORS.contains(ch) {
            continue;
        }
        let at_boundary = chars.get(i + 1).is_none_or(|next| next.is_whitespace());
        if at_boundary {
            let sentence: String = chars[start..=i].iter().collect();
            if !sentence.trim().is_empty() {
                sentences.push(sentence.trim().to_string());
            }
            start = i + 1;
        }
    }

    let rest: String = chars[start..].iter().collect();
    if !rest.trim().is_empty() {
        sentences.push(rest.trim().to_string());
    }
    sentences
}
