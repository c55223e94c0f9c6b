/*!
 * Table density classifier.
 *
 * Geometric detectors also fire on multi-column prose. A real financial table
 * has short cells and is digit heavy; a candidate that fails either test is
 * harvested as prose instead.
 */

use crate::layout::RawTable;

/// Outcome of classifying a table candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Table,
    /// Multi-column prose detected as a table
    Prose,
}

/// Density thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableClassifier {
    /// Mean words per non-empty cell above which the candidate is prose
    pub max_words_per_cell: f64,
    /// Digit share of non-space characters below which the candidate is prose (0 disables)
    pub min_numeric_ratio: f64,
}

impl Default for TableClassifier {
    fn default() -> Self {
        Self {
            max_words_per_cell: 6.0,
            min_numeric_ratio: 0.0,
        }
    }
}

/// Word and character counts over the non-empty cells of a candidate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TableDensity {
    pub cells: usize,
    pub words: usize,
    pub chars: usize,
    pub digits: usize,
}

impl TableDensity {
    pub fn measure(table: &RawTable) -> Self {
        let mut density = Self::default();
        for cell in table.cells.iter().filter(|c| !c.text.trim().is_empty()) {
            density.cells += 1;
            density.words += cell.text.split_whitespace().count();
            for ch in cell.text.chars().filter(|c| !c.is_whitespace()) {
                density.chars += 1;
                if ch.is_numeric() {
                    density.digits += 1;
                }
            }
        }
        density
    }

    pub fn words_per_cell(&self) -> f64 {
        if self.cells == 0 {
            0.0
        } else {
            self.words as f64 / self.cells as f64
        }
    }

    pub fn numeric_ratio(&self) -> f64 {
        if self.chars == 0 {
            0.0
        } else {
            self.digits as f64 / self.chars as f64
        }
    }
}

impl TableClassifier {
    pub fn new(max_words_per_cell: f64, min_numeric_ratio: f64) -> Self {
        Self {
            max_words_per_cell,
            min_numeric_ratio,
        }
    }

    pub fn classify(&self, table: &RawTable) -> TableKind {
        let density = TableDensity::measure(table);
        if density.cells == 0 {
            return TableKind::Table;
        }
        if density.words_per_cell() > self.max_words_per_cell {
            return TableKind::Prose;
        }
        if self.min_numeric_ratio > 0.0 && density.numeric_ratio() < self.min_numeric_ratio {
            return TableKind::Prose;
        }
        TableKind::Table
    }
}
