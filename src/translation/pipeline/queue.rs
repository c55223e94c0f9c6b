/*!
 * Translation queue and unique string map.
 *
 * The queue keeps every harvested span in harvest order with the location it
 * came from. The unique string map is keyed by original text: after routing
 * and translation every queue entry resolves through exactly one map entry.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::layout::{Rect, TableRef, TextSpan};

/// Where a queue entry has to be written back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub page: u32,
    pub bbox: Rect,
    pub is_table_cell: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableRef>,
}

/// One harvested span awaiting translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationQueueEntry {
    pub span_id: usize,
    pub original_text: String,
    pub location: LocationRef,
}

/// Ordered queue of harvested spans
#[derive(Debug, Clone, Default)]
pub struct TranslationQueue {
    entries: Vec<TranslationQueueEntry>,
}

impl TranslationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from harvested spans, keeping their order
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        let mut queue = Self::new();
        for span in spans {
            queue.push(span);
        }
        queue
    }

    /// Append a span
    pub fn push(&mut self, span: TextSpan) {
        self.entries.push(TranslationQueueEntry {
            span_id: span.id,
            location: LocationRef {
                page: span.page,
                bbox: span.bbox,
                is_table_cell: span.is_table_cell,
                table: span.table,
            },
            original_text: span.text,
        });
    }

    pub fn entries(&self) -> &[TranslationQueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct original texts in first-occurrence order
    pub fn distinct_texts(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .filter(|entry| seen.insert(entry.original_text.as_str()))
            .map(|entry| entry.original_text.clone())
            .collect()
    }
}

/// How a distinct string obtained its final value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Numeric/symbolic, never sent to the model
    Bypassed,
    /// Translated and validated
    Model,
    /// Model attempted, every strategy failed, original passed through
    Fallback,
}

/// Final value of one distinct string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedString {
    pub translated: String,
    pub route: Route,
}

/// Original text → resolved value
#[derive(Debug, Clone, Default)]
pub struct UniqueStringMap {
    entries: HashMap<String, ResolvedString>,
}

impl UniqueStringMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value of a distinct string, replacing any earlier one
    pub fn insert(&mut self, original: &str, translated: String, route: Route) {
        self.entries
            .insert(original.to_string(), ResolvedString { translated, route });
    }

    pub fn get(&self, original: &str) -> Option<&ResolvedString> {
        self.entries.get(original)
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with the given route
    pub fn count_route(&self, route: Route) -> usize {
        self.entries.values().filter(|r| r.route == route).count()
    }

    /// Apply `f` to every translated value
    pub fn map_translations<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for resolved in self.entries.values_mut() {
            resolved.translated = f(&resolved.translated);
        }
    }
}
