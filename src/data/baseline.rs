use crate::data::store::join_samples;
use crate::data::{CohortFilter, TrialStore};
use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// A cohort sample taken at the baseline time point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineRow {
    pub sample_id: String,
    pub project_id: String,
    pub subject_id: String,
    pub response: Option<String>,
    pub sex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineSummary {
    pub rows: Vec<BaselineRow>,
    /// Samples per project
    pub project_counts: Vec<KeyCount>,
    /// Distinct subjects per response label
    pub response_counts: Vec<KeyCount>,
    /// Distinct subjects per sex
    pub sex_counts: Vec<KeyCount>,
}

fn distinct_subjects<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<KeyCount> {
    let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (key, subject) in pairs {
        groups.entry(key).or_default().insert(subject);
    }
    groups
        .into_iter()
        .map(|(key, subjects)| KeyCount {
            key: key.to_string(),
            count: subjects.len(),
        })
        .collect()
}

/// Cohort samples at `baseline_time` with per-project, per-response and per-sex counts.
pub fn baseline_summary(
    store: &impl TrialStore,
    filter: &CohortFilter,
    baseline_time: i64,
) -> Result<BaselineSummary> {
    let samples = store.samples()?;
    let subjects = store.subjects()?;

    let rows: Vec<BaselineRow> = join_samples(&samples, &subjects, &[])
        .into_iter()
        .filter(|j| j.sample.time_from_treatment_start == baseline_time)
        .filter_map(|j| {
            let subject = j.subject?;
            filter.matches(j.sample, subject).then(|| BaselineRow {
                sample_id: j.sample.sample_id.clone(),
                project_id: subject.project_id.clone(),
                subject_id: subject.subject_id.clone(),
                response: subject.response.clone(),
                sex: subject.sex.clone(),
            })
        })
        .collect();

    let mut per_project: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &rows {
        *per_project.entry(row.project_id.as_str()).or_default() += 1;
    }
    let project_counts = per_project
        .into_iter()
        .map(|(key, count)| KeyCount {
            key: key.to_string(),
            count,
        })
        .collect();

    let response_counts = distinct_subjects(rows.iter().filter_map(|row| {
        row.response
            .as_deref()
            .map(|response| (response, row.subject_id.as_str()))
    }));
    let sex_counts =
        distinct_subjects(rows.iter().map(|row| (row.sex.as_str(), row.subject_id.as_str())));

    info!(samples = rows.len(), "built baseline summary");

    Ok(BaselineSummary {
        rows,
        project_counts,
        response_counts,
        sex_counts,
    })
}
