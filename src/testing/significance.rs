//! Conventional significance codes for p-values.
//!
//! The buckets follow the usual R-style legend: each bucket is closed at its upper
//! threshold, so `p = 0.05` is `(*)` and `p = 0.050001` is `(.)`.

use serde::Serialize;
use std::fmt;

/// Legend describing the codes, in the order they are checked.
pub const SIGNIFICANCE_LEGEND: &str =
    "Signif. codes: 0.001 '***' | 0.01 '**' | 0.05 '*' | 0.1 '.' | 1 'ns'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SignificanceCode {
    /// p <= 0.001
    HighlySignificant,
    /// 0.001 < p <= 0.01
    VerySignificant,
    /// 0.01 < p <= 0.05
    Significant,
    /// 0.05 < p <= 0.1
    Marginal,
    /// p > 0.1
    NotSignificant,
}

impl SignificanceCode {
    const THRESHOLDS: [(f64, SignificanceCode); 4] = [
        (0.001, SignificanceCode::HighlySignificant),
        (0.01, SignificanceCode::VerySignificant),
        (0.05, SignificanceCode::Significant),
        (0.1, SignificanceCode::Marginal),
    ];

    /// Map a p-value to its code. Values outside `[0, 1]` are not validated; NaN is `(ns)`.
    pub fn classify(p: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(threshold, _)| p <= *threshold)
            .map(|&(_, code)| code)
            .unwrap_or(SignificanceCode::NotSignificant)
    }

    /// Canonical code, e.g. `(***)`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignificanceCode::HighlySignificant => "(***)",
            SignificanceCode::VerySignificant => "(**)",
            SignificanceCode::Significant => "(*)",
            SignificanceCode::Marginal => "(.)",
            SignificanceCode::NotSignificant => "(ns)",
        }
    }

    /// Code with asterisks escaped for Markdown, e.g. `(\*\*\*)`.
    pub fn as_markdown(&self) -> &'static str {
        match self {
            SignificanceCode::HighlySignificant => r"(\*\*\*)",
            SignificanceCode::VerySignificant => r"(\*\*)",
            SignificanceCode::Significant => r"(\*)",
            SignificanceCode::Marginal => "(.)",
            SignificanceCode::NotSignificant => "(ns)",
        }
    }
}

impl fmt::Display for SignificanceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shorthand for [`SignificanceCode::classify`] returning the canonical text.
pub fn significance_code(p: f64) -> &'static str {
    SignificanceCode::classify(p).as_str()
}
