use thiserror::Error;

/// Main error type for the wine quality service
#[derive(Error, Debug)]
pub enum WineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Template errors
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    // Model artifact errors
    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Unsupported model format: {0}")]
    UnsupportedModel(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Server errors
    #[error("Server error: {0}")]
    Server(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for WineError
pub type Result<T> = std::result::Result<T, WineError>;

/// Reasons a submitted form cannot be turned into a feature vector
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("missing form field: {field}")]
    Missing { field: &'static str },

    #[error("form field {field} is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("unreadable form body: {0}")]
    Malformed(String),
}

/// Outcome of a failed prediction request.
///
/// Both variants render the same message to the user; the distinction exists
/// for logs and tests.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] FormError),

    #[error("prediction failed: {0}")]
    Prediction(#[from] WineError),
}

impl PredictError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PredictError::InvalidInput(_))
    }
}
