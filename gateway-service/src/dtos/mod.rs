//! Request and response bodies for the gateway HTTP surface.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenerateTextRequest {
    /// Forwarded to the model as-is; an absent field becomes an empty
    /// prompt and any rejection surfaces through the error path.
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub output: String,
}
