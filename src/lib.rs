//! # responder-statistics
//!
//! Statistics behind a clinical trial dashboard that compares immune cell population
//! frequencies between treatment responders and non-responders.
//!
//! Raw cell counts per sample are normalized into population percentages, and for
//! every population the responder and non-responder percentages are compared with a
//! two-sided Mann-Whitney U test. Each comparison reports U, the p-value, a
//! z-approximation, the effect size r and a significance code, rendered as a short
//! text summary.
//!
//! ## Core Features
//!
//! - **Mann-Whitney U test**: exact and tie-corrected asymptotic p-values
//! - **Significance codes**: `(***)`, `(**)`, `(*)`, `(.)` and `(ns)` buckets
//! - **Per-population comparison**: responder vs non-responder for every population
//! - **Report construction**: frequency table, responder data and baseline summary
//!   computed from an explicit [`data::TrialStore`] handle
//!
//! ## Module Organization
//!
//! - **[`testing`]**: Rank-sum test, effect size and significance classification
//! - **[`comparison`]**: Two-sample comparison and its rendered summary
//! - **[`aggregate`]**: Per-population responder comparison
//! - **[`data`]**: Trial data model, cohort filtering and percentage transforms
//! - **[`report`]**: Report construction and download actions

pub mod aggregate;
pub mod comparison;
pub mod data;
pub mod report;
pub mod testing;

pub use comparison::{Comparison, ComparisonResult, compare};
pub use report::{DownloadAction, Report, ReportConfig, build_report};
pub use testing::SignificanceCode;
