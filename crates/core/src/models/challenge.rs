//! Challenge-related models

use super::payment::PaymentData;
use serde::{Deserialize, Serialize};

/// Challenge category as defined by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChallengeCategory {
    Fitness,
    Mindfulness,
    Productivity,
    Lifestyle,
    Health,
    Coding,
    Reading,
    Finance,
    Learning,
    Writing,
    Creativity,
}

impl ChallengeCategory {
    /// Backend path/query representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeCategory::Fitness => "FITNESS",
            ChallengeCategory::Mindfulness => "MINDFULNESS",
            ChallengeCategory::Productivity => "PRODUCTIVITY",
            ChallengeCategory::Lifestyle => "LIFESTYLE",
            ChallengeCategory::Health => "HEALTH",
            ChallengeCategory::Coding => "CODING",
            ChallengeCategory::Reading => "READING",
            ChallengeCategory::Finance => "FINANCE",
            ChallengeCategory::Learning => "LEARNING",
            ChallengeCategory::Writing => "WRITING",
            ChallengeCategory::Creativity => "CREATIVITY",
        }
    }
}

/// Lifecycle status of a challenge (owned by the backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChallengeStatus {
    Created,
    Ongoing,
    Completed,
    Cancelled,
}

/// The registered geofence for a challenge.
///
/// A single authoritative point and radius a participant must be near
/// when submitting evidence. Immutable once the challenge is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub location_name: String,
    /// Tolerance radius in meters; some challenge records omit it and
    /// get the standard 100 m fence
    #[serde(default = "default_tolerance_radius")]
    pub tolerance_radius: f64,
}

fn default_tolerance_radius() -> f64 {
    100.0
}

/// A challenge as returned by the backend.
///
/// The client holds a read-only cached copy; the backend owns the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ChallengeCategory,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rules: String,
    pub duration_days: u32,
    pub entry_fee: f64,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub status: ChallengeStatus,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub creator_email: Option<String>,
    /// Registered geofence; absent for challenges without a location requirement
    #[serde(default)]
    pub location: Option<GeofenceLocation>,
}

/// Request body for creating a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeCreation {
    pub name: String,
    pub description: String,
    pub category: ChallengeCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub rules: String,
    pub duration_days: u32,
    pub entry_fee: f64,
    pub start_date: String,
    pub end_date: String,
    pub payment: PaymentData,
    pub location: LocationData,
}

/// Request body for joining a challenge (entry fee + participant geofence)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeJoin {
    pub payment: PaymentData,
    pub location: LocationData,
}

/// Location payload sent when creating or joining a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub tolerance_radius: f64,
}

/// A participant of a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeParticipant {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub joined_at: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub avatar_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_challenge_with_location() {
        let json = r#"{
            "id": 42,
            "name": "Morning Run Club",
            "description": "Run every morning",
            "category": "FITNESS",
            "rules": "Photo at the park entrance",
            "durationDays": 21,
            "entryFee": 25.0,
            "featured": true,
            "participantCount": 17,
            "startDate": "2026-09-01",
            "endDate": "2026-09-21",
            "status": "ONGOING",
            "creatorName": "Ana Torres",
            "location": {
                "latitude": 40.4168,
                "longitude": -3.7038,
                "locationName": "Retiro Park",
                "toleranceRadius": 150.0
            }
        }"#;

        let challenge: Challenge = serde_json::from_str(json).unwrap();
        assert_eq!(challenge.id, 42);
        assert_eq!(challenge.category, ChallengeCategory::Fitness);
        assert_eq!(challenge.status, ChallengeStatus::Ongoing);
        let location = challenge.location.unwrap();
        assert_eq!(location.location_name, "Retiro Park");
        assert_eq!(location.tolerance_radius, 150.0);
    }

    #[test]
    fn test_location_without_tolerance_radius_gets_standard_fence() {
        let json = r#"{
            "latitude": 40.4168,
            "longitude": -3.7038,
            "locationName": "Retiro Park"
        }"#;

        let location: GeofenceLocation = serde_json::from_str(json).unwrap();
        assert_eq!(location.tolerance_radius, 100.0);
    }

    #[test]
    fn test_parse_challenge_without_location() {
        let json = r#"{
            "id": 7,
            "name": "Daily Reading",
            "category": "READING",
            "durationDays": 30,
            "entryFee": 10.0,
            "status": "CREATED"
        }"#;

        let challenge: Challenge = serde_json::from_str(json).unwrap();
        assert!(challenge.location.is_none());
        assert_eq!(challenge.participant_count, 0);
    }
}
