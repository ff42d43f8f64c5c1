use serde::{Deserialize, Serialize};

pub mod nonparametric;

/// How the null distribution of the U statistic is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MannWhitneyMethod {
    /// Exact when there are no ties and one sample has at most
    /// [`EXACT_SAMPLE_LIMIT`] values, asymptotic otherwise.
    #[default]
    Auto,
    /// Permutation distribution of U. Ties are not accounted for.
    Exact,
    /// Normal approximation with tie and continuity correction.
    Asymptotic,
}

pub const EXACT_SAMPLE_LIMIT: usize = 8;

impl MannWhitneyMethod {
    pub(crate) fn resolve(self, nx: usize, ny: usize, has_ties: bool) -> MannWhitneyMethod {
        match self {
            MannWhitneyMethod::Auto => {
                if (nx > EXACT_SAMPLE_LIMIT && ny > EXACT_SAMPLE_LIMIT) || has_ties {
                    MannWhitneyMethod::Asymptotic
                } else {
                    MannWhitneyMethod::Exact
                }
            }
            other => other,
        }
    }
}
