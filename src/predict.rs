//! Form submission → verdict.

use std::fmt;

use crate::error::PredictError;
use crate::features::FeatureVector;
use crate::ml::Classifier;

/// Message shown for any failed submission, whatever the cause.
pub const ERROR_MESSAGE: &str = "Error in prediction";

/// Displayed outcome of a successful prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Bad,
}

impl Verdict {
    /// Only label `1` is good; every other label, including labels from a
    /// model with more than two classes, is bad.
    pub fn from_label(label: f64) -> Self {
        if label == 1.0 {
            Self::Good
        } else {
            Self::Bad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good Quality Wine",
            Self::Bad => "Bad Quality Wine",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the submitted fields and score them.
pub fn predict_form<K, V>(
    classifier: &dyn Classifier,
    pairs: &[(K, V)],
) -> Result<Verdict, PredictError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let features = FeatureVector::from_form(pairs)?;
    let label = classifier.predict(&features)?;
    Ok(Verdict::from_label(label))
}

/// The string rendered into the page for a prediction outcome.
pub fn results_message(outcome: &Result<Verdict, PredictError>) -> &'static str {
    match outcome {
        Ok(verdict) => verdict.as_str(),
        Err(_) => ERROR_MESSAGE,
    }
}
