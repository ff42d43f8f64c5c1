//! Clinical trial data model and the transforms that turn raw cell counts into
//! per-sample population frequencies.
//!
//! ## Overview
//!
//! Subjects are enrolled in a project with a condition and treatment and may carry a
//! response label. Each subject gives one or more samples, and each sample has raw
//! counts for the five immune cell populations in [`Population`]. Access to these
//! tables goes through the [`TrialStore`] trait so that report construction receives
//! an explicit data handle.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod baseline;
pub mod frequency;
pub mod store;

pub use baseline::{BaselineRow, BaselineSummary, KeyCount, baseline_summary};
pub use frequency::{FrequencyRow, MeasurementSample, frequency_table, responder_data};
pub use store::{CohortFilter, InMemoryStore, TrialStore};

/// Immune cell populations, in the column order of the cell count table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    BCell,
    Cd8TCell,
    Cd4TCell,
    NkCell,
    Monocyte,
}

impl Population {
    pub const ALL: [Population; 5] = [
        Population::BCell,
        Population::Cd8TCell,
        Population::Cd4TCell,
        Population::NkCell,
        Population::Monocyte,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Population::BCell => "b_cell",
            Population::Cd8TCell => "cd8_t_cell",
            Population::Cd4TCell => "cd4_t_cell",
            Population::NkCell => "nk_cell",
            Population::Monocyte => "monocyte",
        }
    }

    pub fn from_name(name: &str) -> Option<Population> {
        Population::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: String,
    pub project_id: String,
    pub age: Option<u32>,
    pub sex: String,
    pub condition: String,
    pub treatment: String,
    /// `"yes"`, `"no"`, or absent
    pub response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub sample_id: String,
    pub subject_id: String,
    pub sample_type: String,
    pub time_from_treatment_start: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    pub sample_id: String,
    pub b_cell: u64,
    pub cd8_t_cell: u64,
    pub cd4_t_cell: u64,
    pub nk_cell: u64,
    pub monocyte: u64,
}

impl CellCounts {
    pub fn count(&self, population: Population) -> u64 {
        match population {
            Population::BCell => self.b_cell,
            Population::Cd8TCell => self.cd8_t_cell,
            Population::Cd4TCell => self.cd4_t_cell,
            Population::NkCell => self.nk_cell,
            Population::Monocyte => self.monocyte,
        }
    }

    pub fn counts(&self) -> [u64; 5] {
        Population::ALL.map(|p| self.count(p))
    }
}
