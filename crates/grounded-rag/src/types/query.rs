//! Query request types

use serde::{Deserialize, Serialize};

/// Question posted to the query endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Number of chunks to retrieve; the configured default when absent
    #[serde(default)]
    pub k: Option<usize>,
}
