pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod ml;
pub mod predict;

pub use config::AppConfig;
pub use error::{FormError, PredictError, Result, WineError};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use ml::{load_classifier, Classifier, ModelArtifact};
pub use predict::{predict_form, Verdict};
