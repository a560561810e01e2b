//! Trait seams the submission workflow is generic over
//!
//! The orchestrator never talks to the OS or the network directly; it goes
//! through these traits so the whole workflow is testable without a UI
//! harness or a live backend.

use async_trait::async_trait;
use habitleague_core::{
    Coordinate, DailySubmissionStatus, EvidenceSubmissionResponse, Result, SubmitEvidenceRequest,
};
use habitleague_networking::{api, HabitLeagueClient};

/// An image captured or picked on the device, before upload
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Local device URI; doubles as the image reference when upload fails
    pub local_uri: String,
    /// File name sent in the multipart upload (e.g. `evidence.jpg`)
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Device location services (OS capability, consumed not reimplemented)
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Request the device's current coordinates.
    ///
    /// Errors cover both denied permission grants and provider failures;
    /// the workflow treats them as recoverable (the user may retry).
    async fn current_location(&self) -> Result<Coordinate>;
}

/// Device camera / gallery picker (OS capability, consumed not reimplemented)
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Capture or select a photo. `Ok(None)` means the user cancelled.
    async fn acquire_image(&self) -> Result<Option<CapturedImage>>;
}

/// The backend operations the submission workflow needs.
///
/// Methods return plain `Result`s; the documented fail-open and fallback
/// policies are applied by the orchestrator, not here.
#[async_trait]
pub trait EvidenceBackend: Send + Sync {
    async fn daily_status(&self, challenge_id: i64) -> Result<DailySubmissionStatus>;

    async fn upload_image(&self, image: &CapturedImage) -> Result<String>;

    async fn submit(
        &self,
        request: &SubmitEvidenceRequest,
    ) -> Result<EvidenceSubmissionResponse>;
}

#[async_trait]
impl<T: EvidenceBackend> EvidenceBackend for &T {
    async fn daily_status(&self, challenge_id: i64) -> Result<DailySubmissionStatus> {
        (**self).daily_status(challenge_id).await
    }

    async fn upload_image(&self, image: &CapturedImage) -> Result<String> {
        (**self).upload_image(image).await
    }

    async fn submit(
        &self,
        request: &SubmitEvidenceRequest,
    ) -> Result<EvidenceSubmissionResponse> {
        (**self).submit(request).await
    }
}

#[async_trait]
impl EvidenceBackend for HabitLeagueClient {
    async fn daily_status(&self, challenge_id: i64) -> Result<DailySubmissionStatus> {
        self.get_daily_submission_status(challenge_id).await
    }

    async fn upload_image(&self, image: &CapturedImage) -> Result<String> {
        self.upload_evidence_image(&image.file_name, image.bytes.clone())
            .await
    }

    async fn submit(
        &self,
        request: &SubmitEvidenceRequest,
    ) -> Result<EvidenceSubmissionResponse> {
        api::submit_evidence(self, request).await
    }
}
