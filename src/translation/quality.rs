/*!
 * Output validation for model translations.
 *
 * A translation is accepted only if it is non-empty, contains no
 * source-script character and shows no repetition loop.
 */

use crate::script_utils::{contains_source_script, count_source_script};

/// Why a translation was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Output is blank for a non-blank input
    Empty,
    /// Output still contains source-script characters
    SourceScriptLeak { count: usize },
    /// One token repeated back to back
    RepeatedToken { token: String, run: usize },
    /// An n-gram repeated back to back
    RepeatedPhrase { phrase: String, run: usize },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty output"),
            Self::SourceScriptLeak { count } => {
                write!(f, "{} source-script characters in output", count)
            }
            Self::RepeatedToken { token, run } => {
                write!(f, "token '{}' repeated {} times", token, run)
            }
            Self::RepeatedPhrase { phrase, run } => {
                write!(f, "phrase '{}' repeated {} times", phrase, run)
            }
        }
    }
}

/// Translation validator
#[derive(Debug, Clone)]
pub struct TranslationValidator {
    /// Reject when one token appears this many times in a row
    max_repeated_token_run: usize,
    /// Reject when an n-gram (n = 2..=4) repeats this many times in a row
    max_repeated_phrase_run: usize,
}

impl Default for TranslationValidator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TranslationValidator {
    pub fn new(max_repeated_token_run: usize) -> Self {
        Self {
            max_repeated_token_run: max_repeated_token_run.max(2),
            max_repeated_phrase_run: 3,
        }
    }

    /// Validate one unit translation
    pub fn validate(&self, source: &str, output: &str) -> Result<(), Rejection> {
        if output.trim().is_empty() {
            if source.trim().is_empty() {
                return Ok(());
            }
            return Err(Rejection::Empty);
        }

        if contains_source_script(output) {
            return Err(Rejection::SourceScriptLeak {
                count: count_source_script(output),
            });
        }

        let tokens: Vec<String> = output
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();

        self.check_token_runs(&tokens)?;
        self.check_phrase_runs(&tokens)
    }

    fn check_token_runs(&self, tokens: &[String]) -> Result<(), Rejection> {
        let mut run = 1;
        for pair in tokens.windows(2) {
            if pair[0] == pair[1] {
                run += 1;
                if run >= self.max_repeated_token_run {
                    return Err(Rejection::RepeatedToken {
                        token: pair[0].clone(),
                        run,
                    });
                }
            } else {
                run = 1;
            }
        }
        Ok(())
    }

    fn check_phrase_runs(&self, tokens: &[String]) -> Result<(), Rejection> {
        for n in 2..=4 {
            let needed = n * self.max_repeated_phrase_run;
            if tokens.len() < needed {
                break;
            }
            for start in 0..=tokens.len() - needed {
                let phrase = &tokens[start..start + n];
                let mut run = 1;
                let mut next = start + n;
                while next + n <= tokens.len() && &tokens[next..next + n] == phrase {
                    run += 1;
                    next += n;
                }
                if run >= self.max_repeated_phrase_run {
                    return Err(Rejection::RepeatedPhrase {
                        phrase: phrase.join(" "),
                        run,
                    });
                }
            }
        }
        Ok(())
    }
}
