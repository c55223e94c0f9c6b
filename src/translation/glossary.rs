/*!
 * Financial terminology correction.
 *
 * The model renders several accounting terms literally ("Traded Assets",
 * "Property Rights") or as transliterations ("Rasalmal"). This pass maps
 * those outputs onto standard IFRS wording. It runs on every final string,
 * whatever its route.
 */

use std::collections::HashMap;

/// Built-in corrections, model output → standard term
const FINANCIAL_TERMS: &[(&str, &str)] = &[
    ("Untraded liabilities", "Non-current liabilities"),
    ("Traded liabilities", "Current liabilities"),
    ("Untraded Assets", "Non-current assets"),
    ("Traded Assets", "Current assets"),
    ("Property Rights", "Equity"),
    ("TotalProperty", "Total Equity"),
    ("Cash is like cash", "Cash and cash equivalents"),
    ("WantedTax", "Zakat Payable"),
    ("Dion", "Loans"),
    ("Rasalmal", "Capital"),
    ("EarningsKeeping", "Retained Earnings"),
    ("Allocations", "Provisions"),
    ("LiabilitiesContracts", "Lease Liabilities"),
    ("Contracts Rents", "Lease Liabilities"),
    ("AccountsReceivable", "Trade Receivables"),
    ("AccountsPayable", "Trade Payables"),
    ("Inventory", "Inventories"),
    ("Stocks", "Inventories"),
    ("Financing", "Funding"),
    ("Derivative Financial Instruments", "Derivative financial instruments"),
    ("Property rights related to Shareholders", "Equity attributable to shareholders"),
    ("InvestmentsFishratAssociateShare", "Investments in associates"),
    ("InvestmentsViaToolsDebt", "Investments in debt instruments"),
    ("Shorthagel Loans", "Short-term loans"),
    ("Toms Factory & Equipment", "Property, Plant and Equipment"),
    ("AssetsTommedMadinaAkhri", "Other Debit Assets"),
    ("AssetsTommedCityExtreme", "Other Assets"),
    ("InvestmentShortHall11", "Short-term investments"),
    ("NaybalreyesExecutive", "Vice Executive President"),
    ("ReyesBoard", "Chairman of Board"),
    ("Dhammamedina Commercial", "Trade Receivables"),
    ("Dhamdaineh", "Trade Payables"),
];

/// Slack allowed for a partial match: the text may be at most this many
/// characters longer than the term it contains.
const PARTIAL_MATCH_SLACK: usize = 5;

/// Ordered term table with exact, case-insensitive and near-exact matching
#[derive(Debug, Clone)]
pub struct FinancialGlossary {
    terms: Vec<(String, String)>,
    exact: HashMap<String, usize>,
}

impl Default for FinancialGlossary {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

impl FinancialGlossary {
    /// Built-in terms followed by `extra_terms` (an extra term overrides a
    /// built-in one with the same key)
    pub fn new(extra_terms: &HashMap<String, String>) -> Self {
        let mut glossary = Self {
            terms: Vec::new(),
            exact: HashMap::new(),
        };
        for (from, to) in FINANCIAL_TERMS {
            glossary.insert(from, to);
        }
        let mut extras: Vec<_> = extra_terms.iter().collect();
        extras.sort();
        for (from, to) in extras {
            glossary.insert(from, to);
        }
        glossary
    }

    fn insert(&mut self, from: &str, to: &str) {
        match self.exact.get(from) {
            Some(&index) => self.terms[index].1 = to.to_string(),
            None => {
                self.exact.insert(from.to_string(), self.terms.len());
                self.terms.push((from.to_string(), to.to_string()));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Apply the glossary to one final string.
    ///
    /// Returns the input unchanged when no term matches.
    pub fn apply(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return text.to_string();
        }

        if let Some(&index) = self.exact.get(trimmed) {
            return self.terms[index].1.clone();
        }

        let lowered = trimmed.to_lowercase();
        for (from, to) in &self.terms {
            if lowered == from.to_lowercase() {
                return to.clone();
            }
            if trimmed.contains(from.as_str())
                && trimmed.chars().count() < from.chars().count() + PARTIAL_MATCH_SLACK
            {
                return trimmed.replace(from.as_str(), to);
            }
        }

        text.to_string()
    }
}
