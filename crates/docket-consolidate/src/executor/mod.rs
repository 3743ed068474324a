//! Applying approved consolidations through an [`ItemStore`].
//!
//! A merge writes, in order: the updated primary, the archived secondary at
//! an unoccupied archive location, then removes the secondary's original
//! file. Existing archives are never overwritten. A crash between steps
//! leaves at worst a duplicate, never a lost item. A link writes both items
//! independently. Nothing is rolled back on failure.

pub mod plan;

use std::path::PathBuf;

use docket_core::model::WorkItem;
use docket_core::storage::ItemStore;
use tracing::{debug, info, warn};

use crate::analyze::analyze;
use crate::candidate::{ConsolidationCandidate, MergeAction, same_item};
use crate::error::ConsolidationError;
use crate::finder;
use crate::rules::Rules;

pub use plan::{MergePlan, archive_path, plan_link, plan_merge};

/// What an applied consolidation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Merged {
        primary: String,
        archived: String,
        archive_path: PathBuf,
    },
    Linked {
        item1: String,
        item2: String,
    },
}

impl Outcome {
    /// Id of the item that no longer exists in the schedule buckets, if any.
    #[must_use]
    pub fn archived_id(&self) -> Option<&str> {
        match self {
            Self::Merged { archived, .. } => Some(archived),
            Self::Linked { .. } => None,
        }
    }
}

/// Finds and applies consolidations against one store.
#[derive(Debug)]
pub struct Consolidator<S> {
    store: S,
    rules: Rules,
}

impl<S: ItemStore> Consolidator<S> {
    pub const fn new(store: S, rules: Rules) -> Self {
        Self { store, rules }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// # Errors
    ///
    /// Returns [`ConsolidationError::Load`] if the store cannot list items.
    pub fn load_items(&self) -> Result<Vec<WorkItem>, ConsolidationError> {
        self.store
            .list_all_work_items()
            .map_err(ConsolidationError::Load)
    }

    /// Load every item and rank the candidate pairs among them.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::Load`] if the store cannot list items.
    pub fn find_candidates(&self) -> Result<Vec<ConsolidationCandidate>, ConsolidationError> {
        let items = self.load_items()?;
        Ok(finder::find_candidates(&items, &self.rules))
    }

    /// Resolve two ids (exact match first, then unique prefix) and analyze
    /// the pair directly, bypassing the finder's filters.
    ///
    /// # Errors
    ///
    /// Returns `Load` if items cannot be listed, `ItemNotFound` or
    /// `AmbiguousId` if an id does not resolve to exactly one item, and
    /// `SameItem` if both ids resolve to the same item.
    pub fn lookup(
        &self,
        id1: &str,
        id2: &str,
    ) -> Result<ConsolidationCandidate, ConsolidationError> {
        let items = self.load_items()?;
        let item1 = resolve(&items, id1)?;
        let item2 = resolve(&items, id2)?;
        if same_item(item1, item2) {
            return Err(ConsolidationError::SameItem(item1.id.clone()));
        }
        if item1.item_type != item2.item_type {
            warn!(
                item1 = %item1.id,
                item2 = %item2.id,
                "comparing items of different types"
            );
        }
        Ok(analyze(item1, item2, &self.rules))
    }

    /// Apply `candidate` according to its strategy.
    ///
    /// The candidate itself is never modified; new item values are built
    /// and written.
    ///
    /// # Errors
    ///
    /// Returns `SameItem` or `ApprovalDenied` without writing anything when
    /// both sides are one item or `approved` is false, or `Write` naming the
    /// step that failed.
    pub fn perform_consolidation(
        &self,
        candidate: &ConsolidationCandidate,
        approved: bool,
    ) -> Result<Outcome, ConsolidationError> {
        if candidate.is_self_pair() {
            return Err(ConsolidationError::SameItem(candidate.item1.id.clone()));
        }
        if !approved {
            return Err(ConsolidationError::ApprovalDenied {
                item1: candidate.item1.id.clone(),
                item2: candidate.item2.id.clone(),
            });
        }

        match candidate.action() {
            MergeAction::Merge => self.merge(&candidate.item1, &candidate.item2),
            MergeAction::Link => self.link(&candidate.item1, &candidate.item2),
        }
    }

    fn merge(
        &self,
        primary: &WorkItem,
        secondary: &WorkItem,
    ) -> Result<Outcome, ConsolidationError> {
        let archive_to = archive_path(&self.store.archive_dir(), secondary, |path| {
            self.store.path_exists(path)
        });
        let plan = plan_merge(primary, secondary, archive_to);

        self.store
            .write_work_item(&plan.primary)
            .map_err(|e| ConsolidationError::write("write primary", &primary.id, e))?;
        debug!(id = %primary.id, path = %plan.primary.path.display(), "primary written");

        self.store
            .create_work_item(&plan.archived)
            .map_err(|e| ConsolidationError::write("archive secondary", &secondary.id, e))?;
        debug!(id = %secondary.id, path = %plan.archived.path.display(), "secondary archived");

        if !plan.original_path.as_os_str().is_empty() && plan.original_path != plan.archived.path {
            self.store
                .remove_work_item(&plan.original_path)
                .map_err(|e| ConsolidationError::write("remove original", &secondary.id, e))?;
        }

        info!(
            primary = %primary.id,
            secondary = %secondary.id,
            "merged items"
        );
        Ok(Outcome::Merged {
            primary: primary.id.clone(),
            archived: secondary.id.clone(),
            archive_path: plan.archived.path,
        })
    }

    fn link(&self, item1: &WorkItem, item2: &WorkItem) -> Result<Outcome, ConsolidationError> {
        let (forward, backward) = plan_link(item1, item2);

        self.store
            .write_work_item(&forward)
            .map_err(|e| ConsolidationError::write("link", &item1.id, e))?;
        self.store
            .write_work_item(&backward)
            .map_err(|e| ConsolidationError::write("link", &item2.id, e))?;

        info!(item1 = %item1.id, item2 = %item2.id, "linked items");
        Ok(Outcome::Linked {
            item1: item1.id.clone(),
            item2: item2.id.clone(),
        })
    }
}

fn resolve<'a>(items: &'a [WorkItem], id: &str) -> Result<&'a WorkItem, ConsolidationError> {
    if let Some(exact) = items.iter().find(|item| item.id == id) {
        return Ok(exact);
    }
    let matches: Vec<&WorkItem> = items.iter().filter(|item| item.id.starts_with(id)).collect();
    match matches.as_slice() {
        [] => Err(ConsolidationError::ItemNotFound(id.to_string())),
        [single] => Ok(*single),
        many => {
            let mut ids: Vec<String> = many.iter().map(|item| item.id.clone()).collect();
            ids.sort();
            Err(ConsolidationError::AmbiguousId {
                id: id.to_string(),
                matches: ids,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::model::{ItemType, Schedule};

    fn items() -> Vec<WorkItem> {
        ["add-cache", "add-index", "fix-login"]
            .into_iter()
            .map(|id| WorkItem::new(id, ItemType::Plan, id, Schedule::Now))
            .collect()
    }

    #[test]
    fn resolve_prefers_exact_match() {
        let mut all = items();
        all.push(WorkItem::new("add", ItemType::Plan, "x", Schedule::Now));
        assert_eq!(resolve(&all, "add").unwrap().id, "add");
    }

    #[test]
    fn resolve_unique_prefix() {
        assert_eq!(resolve(&items(), "fix").unwrap().id, "fix-login");
        assert_eq!(resolve(&items(), "add-c").unwrap().id, "add-cache");
    }

    #[test]
    fn resolve_reports_missing_and_ambiguous() {
        assert!(matches!(
            resolve(&items(), "nope"),
            Err(ConsolidationError::ItemNotFound(ref id)) if id == "nope"
        ));
        match resolve(&items(), "add") {
            Err(ConsolidationError::AmbiguousId { matches, .. }) => {
                assert_eq!(matches, vec!["add-cache", "add-index"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn same_item_compares_files_then_ids() {
        let mut a = WorkItem::new("x", ItemType::Plan, "x", Schedule::Now);
        let mut b = a.clone();
        assert!(same_item(&a, &b));

        a.path = PathBuf::from("items/now/x.md");
        b.path = PathBuf::from("items/later/x.md");
        assert!(!same_item(&a, &b));

        b.path = a.path.clone();
        b.id = "renamed".into();
        assert!(same_item(&a, &b));
    }

    #[test]
    fn outcome_reports_archived_id() {
        let merged = Outcome::Merged {
            primary: "a".into(),
            archived: "b".into(),
            archive_path: PathBuf::from("items/merged/merged-b.md"),
        };
        assert_eq!(merged.archived_id(), Some("b"));
        let linked = Outcome::Linked {
            item1: "a".into(),
            item2: "b".into(),
        };
        assert_eq!(linked.archived_id(), None);
    }
}
