use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::api::template::Templates;
use crate::error::Result;
use crate::ml::Classifier;

/// Shared application state for request handlers.
///
/// Everything here is read-only after startup, so handlers share it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    /// Loaded classifier
    pub classifier: Arc<dyn Classifier>,

    /// Compiled page templates
    pub templates: Arc<Templates>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>) -> Result<Self> {
        Ok(Self {
            classifier,
            templates: Arc::new(Templates::new()?),
            start_time: Utc::now(),
        })
    }

    /// Get process uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
