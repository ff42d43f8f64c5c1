use crate::data::store::{JoinedSample, join_samples};
use crate::data::{CellCounts, CohortFilter, Population, TrialStore};
use anyhow::Result;
use ndarray::{Array2, Axis};
use serde::Serialize;
use tracing::{info, warn};

/// One population of one sample in the frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub sample: String,
    pub total_count: u64,
    pub population: Population,
    pub count: u64,
    /// Share of the sample's total cell count, in percent, rounded to 4 decimals
    pub percentage: f64,
}

/// Percentage of one cell population in one sample, labelled with the subject's response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementSample {
    pub sample_id: String,
    pub population: String,
    pub response: Option<String>,
    pub percentage: f64,
}

impl MeasurementSample {
    pub fn new(
        sample_id: impl Into<String>,
        population: impl Into<String>,
        response: Option<&str>,
        percentage: f64,
    ) -> Self {
        MeasurementSample {
            sample_id: sample_id.into(),
            population: population.into(),
            response: response.map(str::to_string),
            percentage,
        }
    }
}

/// Count matrix with one row per sample and one column per [`Population`].
pub fn count_matrix(counts: &[&CellCounts]) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((counts.len(), Population::ALL.len()));
    for (mut row, sample_counts) in matrix.axis_iter_mut(Axis(0)).zip(counts) {
        for (cell, value) in row.iter_mut().zip(sample_counts.counts()) {
            *cell = value as f64;
        }
    }
    matrix
}

/// Normalize each row of a count matrix to percentages of the row total.
///
/// Rows summing to zero stay all-zero instead of producing NaN.
pub fn row_percentages(counts: &Array2<f64>) -> Array2<f64> {
    let totals = counts.sum_axis(Axis(1));
    let mut percentages = counts.clone();
    for (mut row, &total) in percentages.axis_iter_mut(Axis(0)).zip(totals.iter()) {
        if total > 0.0 {
            row.mapv_inplace(|count| count / total * 100.0);
        } else {
            row.fill(0.0);
        }
    }
    percentages
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn with_counts<'a>(joined: &[JoinedSample<'a>]) -> Vec<(JoinedSample<'a>, &'a CellCounts)> {
    joined
        .iter()
        .filter_map(|j| j.counts.map(|counts| (*j, counts)))
        .collect()
}

fn warn_empty_samples(rows: &[(JoinedSample<'_>, &CellCounts)], totals: &[u64]) {
    for ((joined, _), &total) in rows.iter().zip(totals) {
        if total == 0 {
            warn!(sample = %joined.sample.sample_id, "sample has a total cell count of zero");
        }
    }
}

/// Relative frequency of every population in every sample of the cohort's sample type,
/// ordered by sample id with populations in column order. Subjects are not read.
pub fn frequency_table(
    store: &impl TrialStore,
    filter: &CohortFilter,
) -> Result<Vec<FrequencyRow>> {
    let samples = store.samples()?;
    let cell_counts = store.cell_counts()?;

    let joined: Vec<_> = join_samples(&samples, &[], &cell_counts)
        .into_iter()
        .filter(|j| filter.matches_sample_type(j.sample))
        .collect();
    let mut rows = with_counts(&joined);
    rows.sort_by(|a, b| a.0.sample.sample_id.cmp(&b.0.sample.sample_id));

    let counts: Vec<&CellCounts> = rows.iter().map(|(_, c)| *c).collect();
    let totals: Vec<u64> = counts.iter().map(|c| c.counts().iter().sum()).collect();
    warn_empty_samples(&rows, &totals);

    let percentages = row_percentages(&count_matrix(&counts));

    let mut table = Vec::with_capacity(rows.len() * Population::ALL.len());
    for (i, (joined, sample_counts)) in rows.iter().enumerate() {
        for (j, population) in Population::ALL.into_iter().enumerate() {
            table.push(FrequencyRow {
                sample: joined.sample.sample_id.clone(),
                total_count: totals[i],
                population,
                count: sample_counts.count(population),
                percentage: round_to(percentages[[i, j]], 4),
            });
        }
    }

    info!(
        samples = rows.len(),
        rows = table.len(),
        "built frequency table"
    );
    Ok(table)
}

/// Population percentages of the cohort samples, labelled with the subject's response.
///
/// Rows are grouped by population in column order, samples in store order within a
/// population. Percentages are not rounded.
pub fn responder_data(
    store: &impl TrialStore,
    filter: &CohortFilter,
) -> Result<Vec<MeasurementSample>> {
    let samples = store.samples()?;
    let subjects = store.subjects()?;
    let cell_counts = store.cell_counts()?;

    let joined: Vec<_> = join_samples(&samples, &subjects, &cell_counts)
        .into_iter()
        .filter(|j| j.subject.is_some_and(|subject| filter.matches(j.sample, subject)))
        .collect();
    let rows = with_counts(&joined);

    let counts: Vec<&CellCounts> = rows.iter().map(|(_, c)| *c).collect();
    let totals: Vec<u64> = counts.iter().map(|c| c.counts().iter().sum()).collect();
    warn_empty_samples(&rows, &totals);

    let percentages = row_percentages(&count_matrix(&counts));

    let mut measurements = Vec::with_capacity(rows.len() * Population::ALL.len());
    for (j, population) in Population::ALL.into_iter().enumerate() {
        for (i, (joined, _)) in rows.iter().enumerate() {
            measurements.push(MeasurementSample {
                sample_id: joined.sample.sample_id.clone(),
                population: population.name().to_string(),
                response: joined.subject.and_then(|s| s.response.clone()),
                percentage: percentages[[i, j]],
            });
        }
    }

    info!(
        samples = rows.len(),
        rows = measurements.len(),
        "built responder data"
    );
    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_row_percentages_sum_to_100() {
        let counts = array![[10.0, 20.0, 30.0, 40.0, 0.0], [1.0, 1.0, 1.0, 0.0, 0.0]];
        let percentages = row_percentages(&counts);
        for row in percentages.axis_iter(Axis(0)) {
            assert_abs_diff_eq!(row.sum(), 100.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(percentages[[0, 3]], 40.0, epsilon = 1e-12);
        assert_abs_diff_eq!(percentages[[1, 0]], 100.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_total_row() {
        let counts = array![[0.0, 0.0, 0.0, 0.0, 0.0]];
        let percentages = row_percentages(&counts);
        assert!(percentages.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.333333, 4), 33.3333);
        assert_eq!(round_to(66.666666, 4), 66.6667);
    }

    #[test]
    fn test_count_matrix_shape() {
        let counts = CellCounts {
            sample_id: "s1".to_string(),
            b_cell: 5,
            cd8_t_cell: 4,
            cd4_t_cell: 3,
            nk_cell: 2,
            monocyte: 1,
        };
        let matrix = count_matrix(&[&counts, &counts]);
        assert_eq!(matrix.dim(), (2, 5));
        assert_eq!(matrix[[1, 0]], 5.0);
        assert_eq!(matrix[[0, 4]], 1.0);
    }
}
