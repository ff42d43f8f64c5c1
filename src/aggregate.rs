use crate::comparison::{Comparison, compare_with};
use crate::data::MeasurementSample;
use crate::testing::inference::MannWhitneyMethod;
use crate::testing::utils::{get_group_indices, unique_in_encounter_order};
use serde::Serialize;
use tracing::{debug, warn};

pub const RESPONDER: &str = "yes";
pub const NON_RESPONDER: &str = "no";

/// Responder vs non-responder comparison of one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationComparison {
    pub population: String,
    pub responders: Vec<f64>,
    pub non_responders: Vec<f64>,
    pub comparison: Comparison,
}

fn percentages_with_response(
    measurements: &[MeasurementSample],
    indices: &[usize],
    label: &str,
) -> Vec<f64> {
    indices
        .iter()
        .map(|&i| &measurements[i])
        .filter(|m| m.response.as_deref() == Some(label))
        .map(|m| m.percentage)
        .collect()
}

/// Compare responders (`"yes"`) with non-responders (`"no"`) within each population.
///
/// Populations are visited in order of first appearance. Labels match exactly and
/// case-sensitively; rows with any other or no label are ignored.
pub fn compare_by_population(measurements: &[MeasurementSample]) -> Vec<PopulationComparison> {
    compare_by_population_with(measurements, MannWhitneyMethod::Auto)
}

pub fn compare_by_population_with(
    measurements: &[MeasurementSample],
    method: MannWhitneyMethod,
) -> Vec<PopulationComparison> {
    let populations = unique_in_encounter_order(measurements.iter().map(|m| m.population.as_str()));

    populations
        .into_iter()
        .map(|population| {
            let indices = get_group_indices(measurements, population, |m| m.population.as_str());
            let responders = percentages_with_response(measurements, &indices, RESPONDER);
            let non_responders = percentages_with_response(measurements, &indices, NON_RESPONDER);

            let comparison = compare_with(&responders, &non_responders, method);
            match comparison.result() {
                Some(result) => debug!(
                    population,
                    n1 = result.n1,
                    n2 = result.n2,
                    p_value = result.p_value,
                    "compared responders"
                ),
                None => warn!(
                    population,
                    responders = responders.len(),
                    non_responders = non_responders.len(),
                    "insufficient data for comparison"
                ),
            }

            PopulationComparison {
                population: population.to_string(),
                responders,
                non_responders,
                comparison,
            }
        })
        .collect()
}
