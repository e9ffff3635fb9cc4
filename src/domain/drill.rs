use serde::{Deserialize, Serialize};

use super::{Timestamp, User, UserId};

pub type DrillId = i64;

/// A billable drill with a per-minute rate.
///
/// `users` is the active set: everyone currently running this drill. The
/// server derives it; the client never edits it locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drill {
    pub id: DrillId,
    pub title: String,
    pub price_per_minute: f64,
    pub created_at: Timestamp,
    #[serde(default)]
    pub users: Vec<User>,
}

impl Drill {
    pub fn active_user_ids(&self) -> Vec<UserId> {
        self.users.iter().map(|u| u.id).collect()
    }

    pub fn is_user_active(&self, user_id: UserId) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }
}

/// Body of the start and stop calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillAssignment {
    pub drill_id: DrillId,
    pub user_ids: Vec<UserId>,
}

/// Response of the start and stop calls: the drill with its updated active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillEnvelope {
    pub drill: Drill,
}
