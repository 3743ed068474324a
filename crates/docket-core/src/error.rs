use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ItemsDirMissing,
    ItemNotFound,
    AmbiguousId,
    UnknownStrategy,
    SameItem,
    InvalidFrontmatter,
    LoadFailed,
    ItemWriteFailed,
    ApprovalDenied,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::ItemsDirMissing => "E1004",
            Self::ItemNotFound => "E2001",
            Self::AmbiguousId => "E2004",
            Self::UnknownStrategy => "E2006",
            Self::SameItem => "E2007",
            Self::InvalidFrontmatter => "E3004",
            Self::LoadFailed => "E3005",
            Self::ItemWriteFailed => "E5001",
            Self::ApprovalDenied => "E7001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ItemsDirMissing => "Items directory not found",
            Self::ItemNotFound => "Item not found",
            Self::AmbiguousId => "Ambiguous item ID",
            Self::UnknownStrategy => "Unknown merge strategy",
            Self::SameItem => "Both sides name the same item",
            Self::InvalidFrontmatter => "Invalid item frontmatter",
            Self::LoadFailed => "Failed to load work items",
            Self::ItemWriteFailed => "Item file write failed",
            Self::ApprovalDenied => "Consolidation not approved",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .docket/config.toml and retry."),
            Self::ItemsDirMissing => {
                Some("Run from the tracker root or pass --root pointing at it.")
            }
            Self::ItemNotFound => Some("Check the item ID with `dk analyze`."),
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::UnknownStrategy => Some(
                "Use merge_content, combine_detailed, combine_summary or reference_only.",
            ),
            Self::SameItem => {
                Some("Pick two different items, or give files sharing an ID distinct ids.")
            }
            Self::InvalidFrontmatter => {
                Some("Each item file must start with a `---` delimited YAML block.")
            }
            Self::LoadFailed => Some("Fix or move the offending item file and retry."),
            Self::ItemWriteFailed => {
                Some("Check disk space and write permissions, then retry the consolidation.")
            }
            Self::ApprovalDenied => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
