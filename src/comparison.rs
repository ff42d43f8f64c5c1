//! Two-sample rank-sum comparison with a human-readable summary.
//!
//! [`compare`] runs a two-sided Mann-Whitney U test between two samples and
//! packages U, the p-value, the z-approximation and the effect size r together
//! with a rendered summary:
//!
//! ```text
//! Mann-Whitney U Test
//! U=3, p=7.000e-01 (ns)
//! n1=3, n2=3
//! Effect Size (r)=-0.2673
//! ```
//!
//! A summary with `p <= 0.05` is wrapped in `**` so it renders bold. If either sample
//! is empty the outcome is [`Comparison::InsufficientData`].

use crate::testing::effect::u_effect_size;
use crate::testing::inference::MannWhitneyMethod;
use crate::testing::inference::nonparametric::mann_whitney;
use crate::testing::{Alternative, SignificanceCode};
use serde::Serialize;
use std::fmt;

pub const TEST_NAME: &str = "Mann-Whitney U Test";

/// Placeholder rendered when one of the groups has no values.
pub const INSUFFICIENT_DATA: &str = "Insufficient data";

/// Results at or below this p-value are emphasized.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStyle {
    /// Significance codes as `(***)`
    #[default]
    Plain,
    /// Significance codes as `(\*\*\*)`, so the bold wrapper survives Markdown
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub n1: usize,
    pub n2: usize,
    /// U of the first sample
    pub u_statistic: f64,
    pub p_value: f64,
    pub z_score: f64,
    pub effect_size_r: f64,
    pub significance: SignificanceCode,
    pub summary: String,
}

impl ComparisonResult {
    pub fn is_significant(&self) -> bool {
        self.p_value <= SIGNIFICANCE_LEVEL
    }

    pub fn render(&self, style: SummaryStyle) -> String {
        let code = match style {
            SummaryStyle::Plain => self.significance.as_str(),
            SummaryStyle::Markdown => self.significance.as_markdown(),
        };

        let text = [
            TEST_NAME.to_string(),
            format!(
                "U={}, p={} {}",
                format_integer(self.u_statistic),
                format_scientific(self.p_value, 3),
                code
            ),
            format!("n1={}, n2={}", self.n1, self.n2),
            format!("Effect Size (r)={}", format_fixed(self.effect_size_r, 4)),
        ]
        .join("\n");

        if self.is_significant() {
            format!("**{}**", text)
        } else {
            text
        }
    }

    pub fn markdown_summary(&self) -> String {
        self.render(SummaryStyle::Markdown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Comparison {
    InsufficientData,
    Computed(ComparisonResult),
}

impl Comparison {
    pub fn result(&self) -> Option<&ComparisonResult> {
        match self {
            Comparison::Computed(result) => Some(result),
            Comparison::InsufficientData => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Comparison::InsufficientData)
    }

    pub fn summary(&self) -> &str {
        match self {
            Comparison::Computed(result) => &result.summary,
            Comparison::InsufficientData => INSUFFICIENT_DATA,
        }
    }

    pub fn render(&self, style: SummaryStyle) -> String {
        match self {
            Comparison::Computed(result) => result.render(style),
            Comparison::InsufficientData => INSUFFICIENT_DATA.to_string(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}

/// Scientific notation with `digits` decimals and a signed, two-digit exponent,
/// e.g. `7.000e-01`.
pub fn format_scientific(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{:.*e}", digits, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

/// Integer part of `value`, or `nan` when it is not a number.
fn format_integer(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        (value as i64).to_string()
    }
}

fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// Two-sided Mann-Whitney comparison of `x` against `y`.
pub fn compare(x: &[f64], y: &[f64]) -> Comparison {
    compare_with(x, y, MannWhitneyMethod::Auto)
}

/// [`compare`] with an explicit choice of null distribution.
pub fn compare_with(x: &[f64], y: &[f64], method: MannWhitneyMethod) -> Comparison {
    if x.is_empty() || y.is_empty() {
        return Comparison::InsufficientData;
    }

    let test = mann_whitney(x, y, Alternative::TwoSided, method);
    let (n1, n2) = (x.len(), y.len());
    let approximation = u_effect_size(test.statistic, n1, n2);

    let mut result = ComparisonResult {
        n1,
        n2,
        u_statistic: test.statistic,
        p_value: test.p_value,
        z_score: approximation.z,
        effect_size_r: approximation.effect_size_r,
        significance: test.significance(),
        summary: String::new(),
    };
    result.summary = result.render(SummaryStyle::Plain);

    Comparison::Computed(result)
}
