/*!
 * Routing of distinct strings around the model.
 *
 * A string that fully matches the whitelist (digits, currency symbols,
 * punctuation, whitespace) bypasses inference and is only digit-normalised.
 * Everything else, including mixed digit and letter strings, needs the model.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::PipelineError;
use crate::translation::normalizer::normalize_digits;

/// Default whitelist: any digit form, currency symbol, punctuation or space
pub const DEFAULT_BYPASS_PATTERN: &str = r"^[\d\p{Sc}\p{P}\s+\-−=<>/]*$";

static DEFAULT_WHITELIST: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_BYPASS_PATTERN).unwrap());

/// Routing decision for one distinct string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Skip the model; carries the digit-normalised value to render
    Bypass(String),
    /// Send to the model; carries the original text
    NeedsTranslation(String),
}

impl Classification {
    pub fn is_bypass(&self) -> bool {
        matches!(self, Self::Bypass(_))
    }
}

/// Whitelist classifier
#[derive(Debug, Clone)]
pub struct Router {
    whitelist: Regex,
}

impl Router {
    /// Compile a router from a whitelist pattern
    pub fn new(pattern: &str) -> Result<Self, PipelineError> {
        Ok(Self {
            whitelist: Regex::new(pattern)?,
        })
    }

    /// Whether `text` fully matches the whitelist
    pub fn is_bypass(&self, text: &str) -> bool {
        self.whitelist.is_match(text)
    }

    /// Classify one distinct string
    pub fn classify(&self, text: &str) -> Classification {
        if self.is_bypass(text) {
            Classification::Bypass(normalize_digits(text))
        } else {
            Classification::NeedsTranslation(text.to_string())
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self {
            whitelist: DEFAULT_WHITELIST.clone(),
        }
    }
}
