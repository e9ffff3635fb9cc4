use serde::{Deserialize, Serialize};

use super::{Drill, DrillId, Timestamp, User, UserId};

pub type SessionId = i64;

/// One user's timed occupation of a drill.
///
/// `stopped_at == None` means the session is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDrillSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub user: User,
    pub drill_id: DrillId,
    pub drill: Drill,
    pub started_at: Timestamp,
    #[serde(default)]
    pub stopped_at: Option<Timestamp>,
}

impl UserDrillSession {
    pub fn is_active(&self) -> bool {
        self.stopped_at.is_none()
    }
}

/// Which slice of the session history to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl SessionFilter {
    pub fn matches(&self, session: &UserDrillSession) -> bool {
        match self {
            SessionFilter::All => true,
            SessionFilter::Active => session.is_active(),
            SessionFilter::Completed => !session.is_active(),
        }
    }
}
