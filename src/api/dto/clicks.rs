//! DTOs for click recording.

use serde::{Deserialize, Serialize};

use crate::application::services::ClickOutcome;

/// Optional body for `POST /public/links/{id}/click`.
///
/// The dedup token may also be sent as an `Idempotency-Key` header; the
/// body wins when both are present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordClickRequest {
    #[serde(default)]
    pub dedup_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordClickResponse {
    pub outcome: &'static str,
}

impl From<ClickOutcome> for RecordClickResponse {
    fn from(outcome: ClickOutcome) -> Self {
        Self {
            outcome: outcome.as_str(),
        }
    }
}
