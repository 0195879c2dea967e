//! Bug domain entity, input validation, and dashboard aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Bug lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

impl From<&str> for BugStatus {
    fn from(s: &str) -> Self {
        match s {
            "in-progress" => BugStatus::InProgress,
            "resolved" => BugStatus::Resolved,
            _ => BugStatus::Open,
        }
    }
}

impl std::fmt::Display for BugStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugStatus::Open => write!(f, "open"),
            BugStatus::InProgress => write!(f, "in-progress"),
            BugStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// Bug priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum BugPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl From<&str> for BugPriority {
    fn from(s: &str) -> Self {
        match s {
            "low" => BugPriority::Low,
            "high" => BugPriority::High,
            _ => BugPriority::Medium,
        }
    }
}

impl std::fmt::Display for BugPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugPriority::Low => write!(f, "low"),
            BugPriority::Medium => write!(f, "medium"),
            BugPriority::High => write!(f, "high"),
        }
    }
}

/// Bug domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bug {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: BugStatus,
    pub priority: BugPriority,
    /// Owning user; immutable after creation
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a bug.
#[derive(Debug, Clone)]
pub struct NewBug {
    pub title: String,
    pub description: String,
    pub status: BugStatus,
    pub priority: BugPriority,
    pub assigned_to: Option<Uuid>,
}

impl NewBug {
    /// Check required fields, collecting every missing one into a single error.
    ///
    /// Pure function, testable without a live store; status and priority
    /// are already constrained by their types at this point.
    pub fn validate(&self) -> AppResult<()> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Partial update for a bug. Only fields present are merged into the
/// existing record. Ownership (`created_by`) is not representable here,
/// so a patch can never transfer a bug to another owner.
#[derive(Debug, Clone, Default)]
pub struct BugPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<BugStatus>,
    pub priority: Option<BugPriority>,
    pub assigned_to: Option<Uuid>,
}

impl BugPatch {
    /// Fields that are present must still be non-empty.
    pub fn validate(&self) -> AppResult<()> {
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(AppError::validation("title cannot be empty"));
        }
        if matches!(&self.description, Some(d) if d.trim().is_empty()) {
            return Err(AppError::validation("description cannot be empty"));
        }
        Ok(())
    }
}

/// Exact-match filter over bug listings; present fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct BugFilter {
    pub status: Option<BugStatus>,
    pub priority: Option<BugPriority>,
    pub assigned_to: Option<Uuid>,
}

/// Bug response (client-facing shape)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BugResponse {
    pub id: Uuid,
    #[schema(example = "Crash on save")]
    pub title: String,
    pub description: String,
    pub status: BugStatus,
    pub priority: BugPriority,
    pub created_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bug> for BugResponse {
    fn from(bug: Bug) -> Self {
        Self {
            id: bug.id,
            title: bug.title,
            description: bug.description,
            status: bug.status,
            priority: bug.priority,
            created_by: bug.created_by,
            assigned_to: bug.assigned_to,
            created_at: bug.created_at,
            updated_at: bug.updated_at,
        }
    }
}

/// Dashboard counts, derived from a single repository snapshot so the
/// per-status counts always sum to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BugStats {
    pub total_bugs: u64,
    pub open_bugs: u64,
    pub in_progress_bugs: u64,
    pub resolved_bugs: u64,
    /// Bugs assigned to the requesting principal
    pub assigned_to_me: u64,
}

impl BugStats {
    /// Count one snapshot of bugs for the given principal.
    pub fn from_snapshot(bugs: &[Bug], principal_id: Uuid) -> Self {
        let mut stats = Self {
            total_bugs: bugs.len() as u64,
            open_bugs: 0,
            in_progress_bugs: 0,
            resolved_bugs: 0,
            assigned_to_me: 0,
        };

        for bug in bugs {
            match bug.status {
                BugStatus::Open => stats.open_bugs += 1,
                BugStatus::InProgress => stats.in_progress_bugs += 1,
                BugStatus::Resolved => stats.resolved_bugs += 1,
            }
            if bug.assigned_to == Some(principal_id) {
                stats.assigned_to_me += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bug(status: BugStatus, assigned_to: Option<Uuid>) -> Bug {
        Bug {
            id: Uuid::new_v4(),
            title: "Title".to_string(),
            description: "Description".to_string(),
            status,
            priority: BugPriority::Medium,
            created_by: Uuid::new_v4(),
            assigned_to,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn validate_collects_all_missing_fields() {
        let input = NewBug {
            title: "  ".to_string(),
            description: String::new(),
            status: BugStatus::Open,
            priority: BugPriority::Low,
            assigned_to: None,
        };

        let err = input.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("title"));
        assert!(message.contains("description"));
    }

    #[test]
    fn validate_accepts_complete_input() {
        let input = NewBug {
            title: "Crash on save".to_string(),
            description: "Editor crashes when saving".to_string(),
            status: BugStatus::Open,
            priority: BugPriority::High,
            assigned_to: None,
        };

        assert!(input.validate().is_ok());
    }

    #[test]
    fn patch_rejects_present_but_empty_fields() {
        let patch = BugPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = BugPatch::default();
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn status_wire_values_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&BugStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        let parsed: BugStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert_eq!(parsed, BugStatus::Resolved);
        // Unrecognized wire values are rejected, not coerced
        assert!(serde_json::from_str::<BugStatus>("\"closed\"").is_err());
    }

    #[test]
    fn stats_counts_sum_to_total() {
        let me = Uuid::new_v4();
        let bugs = vec![
            bug(BugStatus::Open, Some(me)),
            bug(BugStatus::Open, None),
            bug(BugStatus::Open, None),
            bug(BugStatus::Resolved, Some(me)),
        ];

        let stats = BugStats::from_snapshot(&bugs, me);
        assert_eq!(stats.total_bugs, 4);
        assert_eq!(stats.open_bugs, 3);
        assert_eq!(stats.in_progress_bugs, 0);
        assert_eq!(stats.resolved_bugs, 1);
        assert_eq!(stats.assigned_to_me, 2);
        assert_eq!(
            stats.open_bugs + stats.in_progress_bugs + stats.resolved_bugs,
            stats.total_bugs
        );
    }

    #[test]
    fn stats_of_empty_snapshot_are_zero() {
        let stats = BugStats::from_snapshot(&[], Uuid::new_v4());
        assert_eq!(stats.total_bugs, 0);
        assert_eq!(stats.assigned_to_me, 0);
    }
}
