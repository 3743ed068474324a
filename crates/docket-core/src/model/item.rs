use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// The five kinds of supporting document a work item can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Plan,
    Proposal,
    Analysis,
    Update,
    Decision,
}

impl ItemType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Proposal => "proposal",
            Self::Analysis => "analysis",
            Self::Update => "update",
            Self::Decision => "decision",
        }
    }
}

/// Schedule bucket. Variant order is urgency order: `Now < Next < Later`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Now,
    Next,
    Later,
}

impl Schedule {
    pub const ALL: [Self; 3] = [Self::Now, Self::Next, Self::Later];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Next => "next",
            Self::Later => "later",
        }
    }

    /// Return whichever of the two schedules is more urgent.
    #[must_use]
    pub fn most_urgent(self, other: Self) -> Self {
        self.min(other)
    }
}

/// Lifecycle status of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Blocked,
    Completed,
    /// Merged into another item and moved out of the schedule buckets.
    Archived,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A markdown-backed work item as loaded from storage.
///
/// `path` is owned by the storage layer: it records where the item was read
/// from and where the next write will land. It is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub technical_tags: Vec<String>,
    pub schedule: Schedule,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub related_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Frontmatter keys docket does not interpret, written back untouched.
    #[serde(skip)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(skip)]
    pub path: PathBuf,
}

impl WorkItem {
    /// Build an item with empty content, tags and references.
    pub fn new(
        id: impl Into<String>,
        item_type: ItemType,
        summary: impl Into<String>,
        schedule: Schedule,
    ) -> Self {
        Self {
            id: id.into(),
            item_type,
            summary: summary.into(),
            content: String::new(),
            technical_tags: Vec::new(),
            schedule,
            status: Status::Pending,
            related_items: Vec::new(),
            created: None,
            updated: None,
            extra: BTreeMap::new(),
            path: PathBuf::new(),
        }
    }

    /// Completed items are never compared or merged.
    #[must_use]
    pub const fn is_consolidation_eligible(&self) -> bool {
        !matches!(self.status, Status::Completed | Status::Archived)
    }

    /// File name component of the storage path (empty if unset).
    #[must_use]
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamp the `updated` timestamp with the current time.
    pub fn touch(&mut self) {
        self.updated = Some(Utc::now());
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for ItemType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "plan" => Ok(Self::Plan),
            "proposal" => Ok(Self::Proposal),
            "analysis" => Ok(Self::Analysis),
            "update" => Ok(Self::Update),
            "decision" => Ok(Self::Decision),
            _ => Err(ParseEnumError {
                expected: "type",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Schedule {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "now" => Ok(Self::Now),
            "next" => Ok(Self::Next),
            "later" => Ok(Self::Later),
            _ => Err(ParseEnumError {
                expected: "schedule",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s).replace('-', "_");
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}
