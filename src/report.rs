//! Aggregates over session history.
//!
//! Durations are summed in whole seconds while costs are computed per session
//! from floored minutes, so a 65 second session counts 65 s but bills 1 minute.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{DrillId, Timestamp, UserDrillSession, UserId};
use crate::timing::{
    cost, duration_minutes, duration_seconds, format_cost, format_duration_hms,
    format_timestamp_full,
};

pub const ACTIVE_LABEL: &str = "Активний";

#[derive(Debug, Clone, PartialEq)]
pub struct DrillSummary {
    pub drill_id: DrillId,
    pub title: String,
    pub sessions: usize,
    pub total_seconds: i64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportSummary {
    /// Sorted by title.
    pub drills: Vec<DrillSummary>,
    pub total_sessions: usize,
    pub total_seconds: i64,
    pub total_cost: f64,
}

impl ReportSummary {
    pub fn total_duration(&self) -> String {
        format_duration_hms(self.total_seconds)
    }

    pub fn total_cost_label(&self) -> String {
        format_cost(self.total_cost)
    }
}

/// One line of the session history table.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub user_name: String,
    pub drill_title: String,
    pub started: String,
    /// Stop instant, or [`ACTIVE_LABEL`] for a running session.
    pub stopped: String,
    pub duration: String,
    pub rate: String,
    pub cost: String,
    pub active: bool,
}

fn session_cost(session: &UserDrillSession, now: Timestamp) -> f64 {
    let minutes = duration_minutes(session.started_at, session.stopped_at, now);
    cost(minutes, session.drill.price_per_minute)
}

/// Per-drill totals plus grand totals. Running sessions count up to `now`.
pub fn summarize(sessions: &[UserDrillSession], now: Timestamp) -> ReportSummary {
    let mut by_drill: HashMap<DrillId, DrillSummary> = HashMap::new();

    for session in sessions {
        let entry = by_drill.entry(session.drill_id).or_insert_with(|| DrillSummary {
            drill_id: session.drill_id,
            title: session.drill.title.clone(),
            sessions: 0,
            total_seconds: 0,
            total_cost: 0.0,
        });
        entry.sessions += 1;
        entry.total_seconds += duration_seconds(session.started_at, session.stopped_at, now);
        entry.total_cost += session_cost(session, now);
    }

    let mut drills: Vec<DrillSummary> = by_drill.into_values().collect();
    drills.sort_by(|a, b| a.title.cmp(&b.title).then(a.drill_id.cmp(&b.drill_id)));

    ReportSummary {
        total_sessions: drills.iter().map(|d| d.sessions).sum(),
        total_seconds: drills.iter().map(|d| d.total_seconds).sum(),
        total_cost: drills.iter().map(|d| d.total_cost).sum(),
        drills,
    }
}

/// Table rows, newest start first.
pub fn session_rows(sessions: &[UserDrillSession], now: Timestamp) -> Vec<SessionRow> {
    let mut sorted: Vec<&UserDrillSession> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    sorted
        .into_iter()
        .map(|s| SessionRow {
            user_name: s.user.full_name(),
            drill_title: s.drill.title.clone(),
            started: format_timestamp_full(s.started_at),
            stopped: s
                .stopped_at
                .map(format_timestamp_full)
                .unwrap_or_else(|| ACTIVE_LABEL.to_string()),
            duration: format_duration_hms(duration_seconds(s.started_at, s.stopped_at, now)),
            rate: format_cost(s.drill.price_per_minute),
            cost: format_cost(session_cost(s, now)),
            active: s.is_active(),
        })
        .collect()
}

pub fn group_by_user_drill(
    sessions: &[UserDrillSession],
) -> BTreeMap<(UserId, DrillId), Vec<&UserDrillSession>> {
    let mut groups: BTreeMap<(UserId, DrillId), Vec<&UserDrillSession>> = BTreeMap::new();
    for session in sessions {
        groups
            .entry((session.user_id, session.drill_id))
            .or_default()
            .push(session);
    }
    groups
}
