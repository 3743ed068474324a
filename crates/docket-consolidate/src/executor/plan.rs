//! Pure construction of the post-consolidation item values.
//!
//! Nothing here touches storage; the executor writes whatever these
//! functions return, in order.

use std::path::{Path, PathBuf};

use docket_core::model::{Status, WorkItem};

pub const MERGED_SECTION: &str = "## Merged Content";
pub const RELATED_SECTION: &str = "## Related Work";
pub const ARCHIVE_PREFIX: &str = "merged-";

/// Result of folding a secondary item into a primary.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    /// The primary with the secondary's summary, tags, content and urgency
    /// folded in.
    pub primary: WorkItem,
    /// The secondary, marked archived and pointed at its archive location.
    pub archived: WorkItem,
    /// Where the secondary lived before; removed once the archived copy is
    /// written.
    pub original_path: PathBuf,
}

/// Build the merged primary and the secondary archived at `archive_to`.
#[must_use]
pub fn plan_merge(primary: &WorkItem, secondary: &WorkItem, archive_to: PathBuf) -> MergePlan {
    let mut merged = primary.clone();

    if secondary.summary.chars().count() > primary.summary.chars().count() {
        merged.summary.clone_from(&secondary.summary);
    }
    merged.technical_tags = union_tags(&primary.technical_tags, &secondary.technical_tags);
    merged.content = merged_content(&primary.content, secondary);
    merged.schedule = primary.schedule.most_urgent(secondary.schedule);
    merged.related_items.push(secondary.id.clone());
    merged.touch();

    let mut archived = secondary.clone();
    archived.status = Status::Archived;
    archived.content = archive_banner(&primary.id, &secondary.content);
    archived.path = archive_to;
    archived.touch();

    MergePlan {
        primary: merged,
        archived,
        original_path: secondary.path.clone(),
    }
}

/// Cross-reference two items without merging anything.
///
/// `item1` gets the forward entry (id, summary, schedule); `item2` gets the
/// backward entry (id, summary).
#[must_use]
pub fn plan_link(item1: &WorkItem, item2: &WorkItem) -> (WorkItem, WorkItem) {
    let mut forward = item1.clone();
    forward.content = append_related(
        &item1.content,
        &format!(
            "- {}: {} (schedule: {})",
            item2.id, item2.summary, item2.schedule
        ),
    );
    forward.related_items.push(item2.id.clone());
    forward.touch();

    let mut backward = item2.clone();
    backward.content = append_related(
        &item2.content,
        &format!("- {}: {}", item1.id, item1.summary),
    );
    backward.related_items.push(item1.id.clone());
    backward.touch();

    (forward, backward)
}

/// Case-insensitive union, first-seen casing kept, sorted case-insensitively.
#[must_use]
pub fn union_tags(a: &[String], b: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut tags: Vec<String> = a
        .iter()
        .chain(b)
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .map(str::to_owned)
        .collect();
    tags.sort_by_key(|t| t.to_lowercase());
    tags
}

/// First free archive location for `item`, tried in order:
/// `merged-<filename>`, `merged-<stem>-<id>.md`, `merged-<stem>-<id>-<n>.md`.
#[must_use]
pub fn archive_path(
    archive_dir: &Path,
    item: &WorkItem,
    is_taken: impl Fn(&Path) -> bool,
) -> PathBuf {
    let filename = match item.filename() {
        "" => format!("{}.md", item.id),
        name => name.to_string(),
    };
    let preferred = archive_dir.join(format!("{ARCHIVE_PREFIX}{filename}"));
    if !is_taken(&preferred) {
        return preferred;
    }

    let stem = Path::new(&filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(item.id.as_str());
    let with_id = archive_dir.join(format!("{ARCHIVE_PREFIX}{stem}-{}.md", item.id));
    if !is_taken(&with_id) {
        return with_id;
    }

    let mut n = 2_u32;
    loop {
        let numbered = archive_dir.join(format!("{ARCHIVE_PREFIX}{stem}-{}-{n}.md", item.id));
        if !is_taken(&numbered) {
            return numbered;
        }
        n += 1;
    }
}

fn merged_content(primary: &str, secondary: &WorkItem) -> String {
    let mut out = String::with_capacity(primary.len() + secondary.content.len() + 64);
    let head = primary.trim_end();
    if !head.is_empty() {
        out.push_str(head);
        out.push_str("\n\n");
    }
    out.push_str(MERGED_SECTION);
    out.push_str("\n\n");
    if !secondary.content.trim().is_empty() {
        out.push_str(&secondary.content);
        if !secondary.content.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str("---\n*Merged from: ");
    out.push_str(&secondary.id);
    out.push_str("*\n");
    out
}

fn archive_banner(primary_id: &str, original: &str) -> String {
    format!("> **MERGED ITEM — ARCHIVED**\n> merged into: {primary_id}\n\n{original}")
}

/// Append `line` under a trailing `## Related Work` section, starting one if
/// the content does not already end with that section.
fn append_related(content: &str, line: &str) -> String {
    let trimmed = content.trim_end();
    let mut out = String::with_capacity(trimmed.len() + line.len() + 24);
    out.push_str(trimmed);

    if !ends_with_related_section(trimmed) {
        if !trimmed.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(RELATED_SECTION);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(line);
    out.push('\n');
    out
}

fn ends_with_related_section(content: &str) -> bool {
    content
        .lines()
        .rev()
        .find(|line| line.starts_with("## "))
        .is_some_and(|heading| heading.trim_end() == RELATED_SECTION)
}
