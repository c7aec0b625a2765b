//! Category records and the shared default set.

use crate::{PrincipalId, RecordId, SyncState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a category labels income or expense entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Income categories (offerings, donations, ...).
    Income,
    /// Expense categories (utilities, missions, ...).
    Expense,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Income => write!(f, "income"),
            CategoryKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(format!("unknown category kind: {other:?}")),
        }
    }
}

/// A transaction category.
///
/// A category with no owner is a shared system default, seeded
/// locally when the remote category table is empty or unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Client-generated unique ID.
    pub id: RecordId,
    /// Owning user; `None` marks a shared system default.
    pub owner_id: Option<PrincipalId>,
    /// Display name.
    pub name: String,
    /// Category kind.
    pub kind: CategoryKind,
    /// Display color (hex string).
    pub color: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp; drives last-writer-wins merges.
    pub updated_at: DateTime<Utc>,
    /// Local/remote reconciliation state.
    pub sync_state: SyncState,
}

impl Category {
    /// Creates a new user-owned category pending upload.
    #[must_use]
    pub fn new(
        owner_id: PrincipalId,
        name: impl Into<String>,
        kind: CategoryKind,
        color: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            owner_id: Some(owner_id),
            name: name.into(),
            kind,
            color: color.into(),
            created_at: now,
            updated_at: now,
            sync_state: SyncState::Pending,
        }
    }

    /// Returns true for shared system defaults.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.owner_id.is_none()
    }

    /// The default category set seeded when the remote category table
    /// is missing or empty.
    ///
    /// Seeded categories are local-only defaults and are marked
    /// `Synced` so they are never pushed.
    #[must_use]
    pub fn defaults(now: DateTime<Utc>) -> Vec<Category> {
        const SEED: &[(&str, CategoryKind, &str)] = &[
            ("Tithes", CategoryKind::Income, "#2e7d32"),
            ("Offerings", CategoryKind::Income, "#43a047"),
            ("Donations", CategoryKind::Income, "#66bb6a"),
            ("Fundraising", CategoryKind::Income, "#9ccc65"),
            ("Utilities", CategoryKind::Expense, "#c62828"),
            ("Building Maintenance", CategoryKind::Expense, "#e53935"),
            ("Salaries", CategoryKind::Expense, "#ef5350"),
            ("Missions", CategoryKind::Expense, "#8e24aa"),
            ("Supplies", CategoryKind::Expense, "#fb8c00"),
            ("Events", CategoryKind::Expense, "#fdd835"),
        ];

        SEED.iter()
            .map(|(name, kind, color)| Category {
                id: RecordId::new(),
                owner_id: None,
                name: (*name).to_string(),
                kind: *kind,
                color: (*color).to_string(),
                created_at: now,
                updated_at: now,
                sync_state: SyncState::Synced,
            })
            .collect()
    }
}
