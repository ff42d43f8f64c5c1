use crate::data::{CellCounts, Sample, Subject};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Read access to the trial tables.
///
/// Implementations decide where the rows come from; callers only see owned rows and
/// an `anyhow::Error` if the backing store could not be read.
pub trait TrialStore {
    fn subjects(&self) -> Result<Vec<Subject>>;

    fn samples(&self) -> Result<Vec<Sample>>;

    fn cell_counts(&self) -> Result<Vec<CellCounts>>;
}

/// Samples selected for the responder comparison and the baseline summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortFilter {
    pub sample_type: String,
    pub condition: String,
    pub treatment: String,
}

impl Default for CohortFilter {
    fn default() -> Self {
        CohortFilter {
            sample_type: "PBMC".to_string(),
            condition: "melanoma".to_string(),
            treatment: "miraclib".to_string(),
        }
    }
}

impl CohortFilter {
    pub fn matches_sample_type(&self, sample: &Sample) -> bool {
        sample.sample_type == self.sample_type
    }

    pub fn matches(&self, sample: &Sample, subject: &Subject) -> bool {
        self.matches_sample_type(sample)
            && subject.condition == self.condition
            && subject.treatment == self.treatment
    }
}

/// Trial tables held in memory, validated for unique keys.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    subjects: Vec<Subject>,
    samples: Vec<Sample>,
    cell_counts: Vec<CellCounts>,
}

impl InMemoryStore {
    pub fn new(
        subjects: Vec<Subject>,
        samples: Vec<Sample>,
        cell_counts: Vec<CellCounts>,
    ) -> Result<Self> {
        ensure_unique("subject", subjects.iter().map(|s| s.subject_id.as_str()))?;
        ensure_unique("sample", samples.iter().map(|s| s.sample_id.as_str()))?;
        ensure_unique("cell count", cell_counts.iter().map(|c| c.sample_id.as_str()))?;

        Ok(InMemoryStore {
            subjects,
            samples,
            cell_counts,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn ensure_unique<'a>(table: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(anyhow!("Duplicate {} id: {}", table, id));
        }
    }
    Ok(())
}

impl TrialStore for InMemoryStore {
    fn subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.subjects.clone())
    }

    fn samples(&self) -> Result<Vec<Sample>> {
        Ok(self.samples.clone())
    }

    fn cell_counts(&self) -> Result<Vec<CellCounts>> {
        Ok(self.cell_counts.clone())
    }
}

/// A sample joined with its subject and its cell counts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JoinedSample<'a> {
    pub sample: &'a Sample,
    pub subject: Option<&'a Subject>,
    pub counts: Option<&'a CellCounts>,
}

/// Left join of samples onto subjects and cell counts, preserving sample order.
pub(crate) fn join_samples<'a>(
    samples: &'a [Sample],
    subjects: &'a [Subject],
    cell_counts: &'a [CellCounts],
) -> Vec<JoinedSample<'a>> {
    let subjects_by_id: HashMap<&str, &Subject> = subjects
        .iter()
        .map(|s| (s.subject_id.as_str(), s))
        .collect();
    let counts_by_id: HashMap<&str, &CellCounts> = cell_counts
        .iter()
        .map(|c| (c.sample_id.as_str(), c))
        .collect();

    samples
        .iter()
        .map(|sample| JoinedSample {
            sample,
            subject: subjects_by_id.get(sample.subject_id.as_str()).copied(),
            counts: counts_by_id.get(sample.sample_id.as_str()).copied(),
        })
        .collect()
}
