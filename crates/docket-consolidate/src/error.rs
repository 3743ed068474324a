use docket_core::error::ErrorCode;
use docket_core::storage::StoreError;

/// Errors raised while finding or applying consolidations.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    /// The item set could not be loaded. Fatal for the whole run.
    #[error("failed to load work items: {0}")]
    Load(#[source] StoreError),

    /// A write or removal failed part-way through a consolidation.
    /// Earlier writes of the same consolidation are not rolled back.
    #[error("{operation} failed for item {item_id}: {source}")]
    Write {
        operation: &'static str,
        item_id: String,
        #[source]
        source: StoreError,
    },

    /// `perform_consolidation` was called without approval.
    #[error("consolidation of {item1} and {item2} was not approved")]
    ApprovalDenied { item1: String, item2: String },

    #[error("unknown merge strategy '{0}'")]
    UnknownStrategy(String),

    #[error("item '{0}' not found")]
    ItemNotFound(String),

    #[error("item id '{id}' is ambiguous, matches: {}", matches.join(", "))]
    AmbiguousId { id: String, matches: Vec<String> },

    /// Both sides of a pair resolve to the same stored item.
    #[error("cannot consolidate item '{0}' with itself")]
    SameItem(String),
}

impl ConsolidationError {
    pub(crate) fn write(operation: &'static str, item_id: &str, source: StoreError) -> Self {
        Self::Write {
            operation,
            item_id: item_id.to_string(),
            source,
        }
    }

    /// Return the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Load(source) => source.code(),
            Self::Write { .. } => ErrorCode::ItemWriteFailed,
            Self::ApprovalDenied { .. } => ErrorCode::ApprovalDenied,
            Self::UnknownStrategy(_) => ErrorCode::UnknownStrategy,
            Self::ItemNotFound(_) => ErrorCode::ItemNotFound,
            Self::AmbiguousId { .. } => ErrorCode::AmbiguousId,
            Self::SameItem(_) => ErrorCode::SameItem,
        }
    }
}
