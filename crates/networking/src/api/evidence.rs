//! Evidence submission adapter

use crate::HabitLeagueClient;
use habitleague_core::{EvidenceSubmissionResponse, Result, SubmitEvidenceRequest};

/// Submit an evidence record and adapt the backend's created-record
/// answer to the client-side response shape
pub async fn submit_evidence(
    client: &HabitLeagueClient,
    request: &SubmitEvidenceRequest,
) -> Result<EvidenceSubmissionResponse> {
    let created = client.submit_evidence(request).await?;
    Ok(submitted_response(created.id))
}

fn submitted_response(evidence_id: i64) -> EvidenceSubmissionResponse {
    EvidenceSubmissionResponse {
        success: true,
        status: "SUBMITTED".to_string(),
        message: "Evidence submitted successfully".to_string(),
        evidence_id: Some(evidence_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_evidence_maps_to_submitted_response() {
        let response = submitted_response(9);
        assert!(response.success);
        assert_eq!(response.status, "SUBMITTED");
        assert_eq!(response.evidence_id, Some(9));
    }
}
