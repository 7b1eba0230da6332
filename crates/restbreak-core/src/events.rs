use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a break session came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    /// An overlay's dismiss action was used.
    Dismissed,
    /// The countdown reached zero.
    Expired,
}

/// Every state change in the engine produces an Event.
/// The CLI prints them; a GUI shell would forward them to its views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The reminder timer was (re)armed with a fresh period.
    SchedulerArmed {
        interval_secs: u32,
        at: DateTime<Utc>,
    },
    SchedulerStopped {
        at: DateTime<Utc>,
    },
    /// The pending skip count was set by a user command.
    SkipsUpdated {
        pending_skips: u32,
        at: DateTime<Utc>,
    },
    /// A reminder fire was consumed by a pending skip.
    BreakSkipped {
        pending_skips: u32,
        at: DateTime<Utc>,
    },
    BreakStarted {
        session_id: Uuid,
        total_seconds: u32,
        overlays: usize,
        background: String,
        foreground: String,
        at: DateTime<Utc>,
    },
    /// A reminder fired while a break was still on screen.
    BreakAlreadyActive {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    CountdownTicked {
        session_id: Uuid,
        remaining_seconds: u32,
        progress_ratio: f64,
        at: DateTime<Utc>,
    },
    BreakEnded {
        session_id: Uuid,
        reason: EndReason,
        elapsed_seconds: u32,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::BreakEnded {
            session_id: Uuid::nil(),
            reason: EndReason::Expired,
            elapsed_seconds: 60,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "BreakEnded");
        assert_eq!(json["reason"], "expired");
        assert_eq!(json["elapsed_seconds"], 60);
    }
}
