//! Achievement models

use serde::{Deserialize, Serialize};

/// An achievement from GET /api/achievements (unlock state is per-user)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub max_progress: Option<u32>,
    #[serde(default)]
    pub points: Option<u32>,
}
