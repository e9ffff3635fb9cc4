use crate::domain::{DrillAssignment, DrillId, UserId};

/// Start or stop a drill for a set of users.
///
/// Both run remotely; the store is patched with the drill the server returns.
#[derive(Debug, Clone, PartialEq)]
pub enum DrillAction {
    Start(Vec<UserId>),
    Stop(Vec<UserId>),
}

impl DrillAction {
    pub fn user_ids(&self) -> &[UserId] {
        match self {
            DrillAction::Start(ids) | DrillAction::Stop(ids) => ids,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DrillAction::Start(_) => "start",
            DrillAction::Stop(_) => "stop",
        }
    }

    pub fn assignment(&self, drill_id: DrillId) -> DrillAssignment {
        DrillAssignment {
            drill_id,
            user_ids: self.user_ids().to_vec(),
        }
    }
}
