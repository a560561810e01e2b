//! Habit League Engine - Geofence validation and the evidence
//! submission workflow

pub mod geofence;
pub mod providers;
pub mod submission;

pub use geofence::{validate_location, LocationValidation};
pub use providers::{CapturedImage, EvidenceBackend, LocationProvider, MediaProvider};
pub use submission::{
    transition, SubmissionEvent, SubmissionOrchestrator, SubmissionOutcome, SubmissionState,
};
