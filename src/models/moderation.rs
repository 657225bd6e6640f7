use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who moderated an entity, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationAudit {
    pub admin_id: String,
    pub admin_name: String,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ModerationAudit {
    /// Placeholder for rows moderated by a partial update that left no audit trail.
    pub fn unknown() -> Self {
        Self {
            admin_id: "unknown".to_string(),
            admin_name: "unknown".to_string(),
            reason: None,
            timestamp: DateTime::<Utc>::default(),
        }
    }
}

/// Discriminant of a moderation variant, used as the predicate of conditional updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationKind {
    None,
    Blocked,
    Deleted,
}

impl ModerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationKind::None => "none",
            ModerationKind::Blocked => "blocked",
            ModerationKind::Deleted => "deleted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(ModerationKind::None),
            "blocked" => Some(ModerationKind::Blocked),
            "deleted" => Some(ModerationKind::Deleted),
            _ => None,
        }
    }
}

/// Result of a single-document conditional update.
///
/// `matched` counts the documents the id resolved to, `modified` the ones whose
/// state actually changed. `modified == 0` with `matched == 1` means the target
/// was already in the requested state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl MutationOutcome {
    pub const MISSING: MutationOutcome = MutationOutcome {
        matched: 0,
        modified: 0,
    };
    pub const UNCHANGED: MutationOutcome = MutationOutcome {
        matched: 1,
        modified: 0,
    };
    pub const APPLIED: MutationOutcome = MutationOutcome {
        matched: 1,
        modified: 1,
    };

    pub fn is_effective(&self) -> bool {
        self.matched == 1 && self.modified == 1
    }

    pub fn is_missing(&self) -> bool {
        self.matched == 0
    }

    pub fn is_noop(&self) -> bool {
        self.matched > 0 && self.modified == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_distinguishes_missing_from_noop() {
        assert!(MutationOutcome::MISSING.is_missing());
        assert!(!MutationOutcome::MISSING.is_noop());
        assert!(MutationOutcome::UNCHANGED.is_noop());
        assert!(!MutationOutcome::UNCHANGED.is_effective());
        assert!(MutationOutcome::APPLIED.is_effective());
    }

    #[test]
    fn kind_round_trips_through_column_text() {
        for kind in [
            ModerationKind::None,
            ModerationKind::Blocked,
            ModerationKind::Deleted,
        ] {
            assert_eq!(ModerationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ModerationKind::parse("cancelled"), None);
    }
}
