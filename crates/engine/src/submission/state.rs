//! Pure state machine for one evidence submission attempt
//!
//! States and transitions mirror the capture flow exactly: daily-status
//! gate, media capture, location fix, local geofence check, upload,
//! submission. `transition` is a pure function so the ordering and
//! cancellation guarantees can be tested without any I/O.

use habitleague_core::Coordinate;

/// State of a single submission attempt.
///
/// `Blocked`, `RejectedLocally`, `Completed` and `SubmissionFailed` are
/// terminal for the attempt; `LocationFailed` is recoverable via
/// [`SubmissionEvent::RetryLocation`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    /// No capture in progress
    Idle,
    /// Asking the backend whether the user already submitted today
    AwaitingDailyStatus,
    /// Already submitted today; the user must wait for the next day
    Blocked,
    /// Waiting for the user to capture or select a photo
    AwaitingMedia,
    /// Requesting device coordinates
    AwaitingLocation { image_uri: String },
    /// Location request failed; the user may retry
    LocationFailed { image_uri: String, reason: String },
    /// Running the local geofence check
    Validating {
        image_uri: String,
        coordinate: Coordinate,
    },
    /// Outside the tolerance radius; surfaced so the user can move closer
    RejectedLocally {
        distance: f64,
        tolerance_radius: f64,
    },
    /// Uploading the image to obtain a stable reference
    Uploading {
        image_uri: String,
        coordinate: Coordinate,
    },
    /// Sending the evidence record to the backend
    Submitting {
        image_url: String,
        coordinate: Coordinate,
    },
    /// Backend accepted the evidence
    Completed {
        evidence_id: Option<i64>,
        status: String,
    },
    /// Backend rejected the evidence or the request failed
    SubmissionFailed { message: String },
}

impl SubmissionState {
    /// Terminal for this attempt (requires acknowledgement before a new
    /// attempt starts)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Blocked
                | SubmissionState::RejectedLocally { .. }
                | SubmissionState::Completed { .. }
                | SubmissionState::SubmissionFailed { .. }
        )
    }

    /// A capture is underway; a second attempt must be refused
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, SubmissionState::Idle) && !self.is_terminal()
    }
}

/// Events fed into [`transition`], produced by the driver as each side
/// effect completes (or by the user)
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    /// Workflow entry
    Start,
    /// Daily-status response (already fail-opened by the driver)
    DailyStatus { has_submitted_today: bool },
    /// The user captured or selected a photo
    MediaCaptured { image_uri: String },
    /// The user backed out of the capture screen
    MediaCancelled,
    /// Device coordinates obtained
    LocationAcquired { coordinate: Coordinate },
    /// Location permission denied or provider error
    LocationUnavailable { reason: String },
    /// Manual retry after a location failure
    RetryLocation,
    /// Local geofence check passed
    GeofencePassed,
    /// Local geofence check failed
    GeofenceRejected {
        distance: f64,
        tolerance_radius: f64,
    },
    /// Image reference resolved (uploaded URL or local-URI fallback)
    ImageUploaded { image_url: String },
    /// Backend accepted the submission
    SubmissionSucceeded {
        evidence_id: Option<i64>,
        status: String,
    },
    /// Backend rejected the submission or the request failed
    SubmissionErrored { message: String },
    /// The user abandoned the flow; discard all in-flight work
    Abandon,
}

/// Pure transition function: `(state, event) -> state`.
///
/// Events that do not apply to the current state leave it unchanged, so a
/// stale callback can never move the machine.
pub fn transition(state: SubmissionState, event: SubmissionEvent) -> SubmissionState {
    use SubmissionEvent as E;
    use SubmissionState as S;

    match (state, event) {
        (S::Idle, E::Start) => S::AwaitingDailyStatus,

        (S::AwaitingDailyStatus, E::DailyStatus { has_submitted_today }) => {
            if has_submitted_today {
                S::Blocked
            } else {
                S::AwaitingMedia
            }
        }

        (S::AwaitingMedia, E::MediaCaptured { image_uri }) => S::AwaitingLocation { image_uri },
        (S::AwaitingMedia, E::MediaCancelled) => S::Idle,

        (S::AwaitingLocation { image_uri }, E::LocationAcquired { coordinate }) => S::Validating {
            image_uri,
            coordinate,
        },
        (S::AwaitingLocation { image_uri }, E::LocationUnavailable { reason }) => {
            S::LocationFailed { image_uri, reason }
        }

        (S::LocationFailed { image_uri, .. }, E::RetryLocation) => {
            S::AwaitingLocation { image_uri }
        }

        (
            S::Validating {
                image_uri,
                coordinate,
            },
            E::GeofencePassed,
        ) => S::Uploading {
            image_uri,
            coordinate,
        },
        (
            S::Validating { .. },
            E::GeofenceRejected {
                distance,
                tolerance_radius,
            },
        ) => S::RejectedLocally {
            distance,
            tolerance_radius,
        },

        (S::Uploading { coordinate, .. }, E::ImageUploaded { image_url }) => S::Submitting {
            image_url,
            coordinate,
        },

        (
            S::Submitting { .. },
            E::SubmissionSucceeded {
                evidence_id,
                status,
            },
        ) => S::Completed {
            evidence_id,
            status,
        },
        (S::Submitting { .. }, E::SubmissionErrored { message }) => {
            S::SubmissionFailed { message }
        }

        // Abandonment from any non-terminal state discards the attempt
        (state, E::Abandon) if !state.is_terminal() => S::Idle,

        // Everything else is a stale or out-of-order event
        (state, _) => state,
    }
}
