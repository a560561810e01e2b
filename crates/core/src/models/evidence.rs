//! Evidence-related models for the /api/evidences endpoints

use serde::{Deserialize, Serialize};

/// An evidence record as returned by the backend.
///
/// `ai_validated` and `location_valid` are assigned authoritatively by the
/// backend after submission; the client's local geofence check is a
/// pre-flight optimization and never sets either flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: i64,
    #[serde(default)]
    pub challenge_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub ai_validated: bool,
    #[serde(default)]
    pub location_valid: bool,
}

/// Request body for POST /api/evidences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEvidenceRequest {
    pub challenge_id: i64,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Response from GET /api/evidences/challenge/{id}/daily-status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySubmissionStatus {
    /// Whether the current user already submitted evidence today
    /// (server-defined day boundary)
    pub has_submitted_today: bool,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub next_submission_date: Option<String>,
}

/// Response from POST /api/evidences/upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub image_url: String,
}

/// Client-side view of a completed evidence submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSubmissionResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub evidence_id: Option<i64>,
}

/// Minimal shape of a created evidence record (POST /api/evidences)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvidence {
    pub id: i64,
}

/// Aggregate evidence statistics from GET /api/evidences/my-stats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceStats {
    #[serde(default)]
    pub total_submissions: u32,
    #[serde(default)]
    pub ai_validated_count: u32,
    #[serde(default)]
    pub location_valid_count: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
}
