use crate::aggregate::{PopulationComparison, compare_by_population_with};
use crate::data::{
    BaselineRow, BaselineSummary, CohortFilter, FrequencyRow, MeasurementSample, TrialStore,
    baseline_summary, frequency_table, responder_data,
};
use crate::testing::inference::MannWhitneyMethod;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub cohort: CohortFilter,
    /// `time_from_treatment_start` of baseline samples
    pub baseline_time: i64,
    pub frequency_filename: String,
    pub baseline_filename: String,
    pub test_method: MannWhitneyMethod,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            cohort: CohortFilter::default(),
            baseline_time: 0,
            frequency_filename: "frequency_data.csv".to_string(),
            baseline_filename: "baseline_melanoma_miraclib_pbmc_samples.csv".to_string(),
            test_method: MannWhitneyMethod::Auto,
        }
    }
}

/// Everything the dashboard displays, computed once from a data handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub frequency_table: Vec<FrequencyRow>,
    pub responder_data: Vec<MeasurementSample>,
    pub comparisons: Vec<PopulationComparison>,
    pub baseline: BaselineSummary,
    frequency_filename: String,
    baseline_filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadAction {
    Frequency,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dataset<'a> {
    Frequency(&'a [FrequencyRow]),
    Baseline(&'a [BaselineRow]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportTarget<'a> {
    pub dataset: Dataset<'a>,
    pub filename: &'a str,
}

impl Report {
    pub fn export(&self, action: DownloadAction) -> ExportTarget<'_> {
        match action {
            DownloadAction::Frequency => ExportTarget {
                dataset: Dataset::Frequency(&self.frequency_table),
                filename: &self.frequency_filename,
            },
            DownloadAction::Baseline => ExportTarget {
                dataset: Dataset::Baseline(&self.baseline.rows),
                filename: &self.baseline_filename,
            },
        }
    }

    pub fn comparison(&self, population: &str) -> Option<&PopulationComparison> {
        self.comparisons.iter().find(|c| c.population == population)
    }
}

/// Load the trial tables through `store` and compute every table and comparison.
pub fn build_report(store: &impl TrialStore, config: &ReportConfig) -> Result<Report> {
    let frequency_table =
        frequency_table(store, &config.cohort).context("Failed to build frequency table")?;
    let responder_data =
        responder_data(store, &config.cohort).context("Failed to load responder data")?;
    let baseline = baseline_summary(store, &config.cohort, config.baseline_time)
        .context("Failed to build baseline summary")?;

    let comparisons = compare_by_population_with(&responder_data, config.test_method);

    info!(
        frequency_rows = frequency_table.len(),
        populations = comparisons.len(),
        baseline_samples = baseline.rows.len(),
        "report built"
    );

    Ok(Report {
        frequency_table,
        responder_data,
        comparisons,
        baseline,
        frequency_filename: config.frequency_filename.clone(),
        baseline_filename: config.baseline_filename.clone(),
    })
}
