use single_utilities::traits::FloatOps;
use std::collections::HashMap;

pub mod effect;
pub mod inference;
pub mod significance;

pub mod utils;

pub use significance::SignificanceCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alternative {
    #[default]
    TwoSided,
    Less,
    Greater,
}

#[derive(Debug, Clone)]
pub struct TestResult<T> {
    /// The test statistic value (e.g. the U statistic of the first sample)
    pub statistic: T,
    /// The p-value of the test
    pub p_value: T,
    /// Effect size measurement
    pub effect_size: Option<T>,
    /// Standard error of the test statistic
    pub standard_error: Option<T>,
    /// Additional test-specific information
    pub metadata: HashMap<String, T>,
}

impl<T> TestResult<T>
where
    T: FloatOps,
{
    /// Create a new test result with minimal information
    pub fn new(statistic: T, p_value: T) -> Self {
        TestResult {
            statistic,
            p_value,
            effect_size: None,
            standard_error: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a new test result with effect size
    pub fn with_effect_size(statistic: T, p_value: T, effect_size: T) -> Self {
        TestResult {
            statistic,
            p_value,
            effect_size: Some(effect_size),
            standard_error: None,
            metadata: HashMap::new(),
        }
    }

    /// Add standard error to the result
    pub fn with_standard_error(mut self, se: T) -> Self {
        self.standard_error = Some(se);
        self
    }

    /// Add additional metadata
    pub fn with_metadata(mut self, key: &str, value: T) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn metadata_value(&self, key: &str) -> Option<T> {
        self.metadata.get(key).copied()
    }

    /// Check if the result is significant at the given threshold (inclusive)
    pub fn is_significant(&self, alpha: T) -> bool {
        self.p_value <= alpha
    }

    /// Significance code of the p-value
    pub fn significance(&self) -> SignificanceCode {
        SignificanceCode::classify(self.p_value.to_f64().unwrap_or(f64::NAN))
    }
}
