use super::frontmatter::{render_document, split_frontmatter};
use super::{ItemStore, StoreError};
use crate::config::StorageConfig;
use crate::model::{ItemType, Schedule, Status, WorkItem};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Schedule buckets scanned by [`MarkdownStore::list_all_work_items`].
pub const BUCKETS: [&str; 4] = ["now", "next", "later", "closed"];

/// Bucket that receives merged-away items. Never listed.
pub const ARCHIVE_DIR: &str = "merged";

/// Filesystem-backed [`ItemStore`] over `<root>/<items_dir>/<bucket>/*.md`.
#[derive(Debug, Clone)]
pub struct MarkdownStore {
    items_root: PathBuf,
}

/// On-disk frontmatter schema.
#[derive(Debug, Serialize, Deserialize)]
struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type")]
    item_type: ItemType,
    #[serde(default)]
    summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule: Option<Schedule>,
    #[serde(default)]
    status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    technical_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    related_items: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    created: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

/// Accept RFC 3339, `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` date.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(naive.and_utc()));
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(naive.and_utc()));
    }
    Err(serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}

impl MarkdownStore {
    /// Create a store rooted at `items_root` without checking that it exists.
    pub fn new(items_root: impl Into<PathBuf>) -> Self {
        Self {
            items_root: items_root.into(),
        }
    }

    /// Open the store for a tracker rooted at `project_root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingItemsDir`] if the items directory does not
    /// exist.
    pub fn open(project_root: &Path, config: &StorageConfig) -> Result<Self, StoreError> {
        let items_root = project_root.join(&config.items_dir);
        if !items_root.is_dir() {
            return Err(StoreError::MissingItemsDir(items_root));
        }
        Ok(Self::new(items_root))
    }

    #[must_use]
    pub fn items_root(&self) -> &Path {
        &self.items_root
    }

    /// Path a new item with `filename` would get in the `schedule` bucket.
    #[must_use]
    pub fn bucket_path(&self, schedule: Schedule, filename: &str) -> PathBuf {
        self.items_root.join(schedule.as_str()).join(filename)
    }

    /// Read and parse one item file.
    ///
    /// `bucket` supplies the schedule when the frontmatter omits one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its frontmatter is
    /// missing or invalid.
    pub fn read_item(&self, path: &Path, bucket: Option<&str>) -> Result<WorkItem, StoreError> {
        let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        parse_item(&raw, path, bucket)
    }

    fn list_bucket(&self, bucket: &str) -> Result<Vec<WorkItem>, StoreError> {
        let dir = self.items_root.join(bucket);
        if !dir.is_dir() {
            trace!(bucket, "bucket directory absent, skipping");
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .iter()
            .map(|path| self.read_item(path, Some(bucket)))
            .collect()
    }
}

impl ItemStore for MarkdownStore {
    fn list_all_work_items(&self) -> Result<Vec<WorkItem>, StoreError> {
        let mut items = Vec::new();
        for bucket in BUCKETS {
            items.extend(self.list_bucket(bucket)?);
        }
        debug!(count = items.len(), root = %self.items_root.display(), "loaded work items");
        Ok(items)
    }

    fn write_work_item(&self, item: &WorkItem) -> Result<(), StoreError> {
        write_document(item, true)
    }

    fn create_work_item(&self, item: &WorkItem) -> Result<(), StoreError> {
        write_document(item, false)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_work_item(&self, path: &Path) -> Result<(), StoreError> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed work item file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn archive_dir(&self) -> PathBuf {
        self.items_root.join(ARCHIVE_DIR)
    }
}

/// Render `item` and move it into place at `item.path`. With `replace` unset
/// an existing file is left alone and the write fails.
fn write_document(item: &WorkItem, replace: bool) -> Result<(), StoreError> {
    let path = item.path();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

    let document = render_item(item)?;

    // Write beside the target and rename so a crash never leaves a
    // truncated item file behind.
    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
    tmp.write_all(document.as_bytes())
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    if replace {
        tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    } else {
        tmp.persist_noclobber(path)
            .map_err(|e| StoreError::io(path, e.error))?;
    }

    debug!(id = %item.id, path = %path.display(), "wrote work item");
    Ok(())
}

fn parse_item(raw: &str, path: &Path, bucket: Option<&str>) -> Result<WorkItem, StoreError> {
    let (yaml, body) = split_frontmatter(raw).ok_or_else(|| StoreError::Frontmatter {
        path: path.to_path_buf(),
        reason: "missing `---` delimited frontmatter block".to_string(),
    })?;

    let fm: Frontmatter = serde_yaml::from_str(yaml).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    let id = match fm.id.filter(|id| !id.trim().is_empty()) {
        Some(id) => id,
        None => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| StoreError::Frontmatter {
                path: path.to_path_buf(),
                reason: "no `id` and no usable file name".to_string(),
            })?,
    };

    let schedule = match fm.schedule {
        Some(schedule) => schedule,
        None => bucket
            .and_then(|b| b.parse::<Schedule>().ok())
            .unwrap_or(Schedule::Later),
    };

    Ok(WorkItem {
        id,
        item_type: fm.item_type,
        summary: fm.summary,
        content: body.to_string(),
        technical_tags: fm.technical_tags,
        schedule,
        status: fm.status,
        related_items: fm.related_items,
        created: fm.created,
        updated: fm.updated,
        extra: fm.extra,
        path: path.to_path_buf(),
    })
}

fn render_item(item: &WorkItem) -> Result<String, StoreError> {
    let fm = Frontmatter {
        id: Some(item.id.clone()),
        item_type: item.item_type,
        summary: item.summary.clone(),
        schedule: Some(item.schedule),
        status: item.status,
        technical_tags: item.technical_tags.clone(),
        related_items: item.related_items.clone(),
        created: item.created,
        updated: item.updated,
        extra: item.extra.clone(),
    };
    let yaml = serde_yaml::to_string(&fm).map_err(|source| StoreError::Yaml {
        path: item.path.clone(),
        source,
    })?;
    Ok(render_document(&yaml, &item.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_raw(root: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn lists_items_from_all_buckets_but_not_archive() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_raw(
            root,
            "now/a.md",
            "---\nid: a\ntype: plan\nsummary: Add caching\n---\n\nbody a\n",
        );
        write_raw(
            root,
            "later/b.md",
            "---\nid: b\ntype: decision\nsummary: Pick db\nstatus: blocked\n---\n\nbody b\n",
        );
        write_raw(
            root,
            "closed/c.md",
            "---\nid: c\ntype: plan\nsummary: Old\nstatus: completed\nschedule: next\n---\n",
        );
        write_raw(
            root,
            "merged/merged-d.md",
            "---\nid: d\ntype: plan\nsummary: Gone\nstatus: archived\n---\n",
        );
        write_raw(root, "now/notes.txt", "not an item");

        let store = MarkdownStore::new(root);
        let items = store.list_all_work_items().unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        assert_eq!(items[0].schedule, Schedule::Now);
        assert_eq!(items[0].content, "body a\n");
        assert_eq!(items[1].schedule, Schedule::Later);
        assert_eq!(items[1].status, Status::Blocked);
        assert_eq!(items[2].schedule, Schedule::Next);
        assert_eq!(items[2].status, Status::Completed);
    }

    #[test]
    fn missing_id_falls_back_to_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = write_raw(
            dir.path(),
            "next/20240101-cache-plan.md",
            "---\ntype: plan\nsummary: Cache\n---\n",
        );
        let item = MarkdownStore::new(dir.path())
            .read_item(&path, Some("next"))
            .unwrap();
        assert_eq!(item.id, "20240101-cache-plan");
        assert_eq!(item.schedule, Schedule::Next);
    }

    #[test]
    fn missing_frontmatter_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_raw(dir.path(), "now/bad.md", "# no frontmatter\n");
        let err = MarkdownStore::new(dir.path())
            .list_all_work_items()
            .unwrap_err();
        assert!(matches!(err, StoreError::Frontmatter { .. }));
    }

    #[test]
    fn invalid_enum_value_is_a_yaml_error() {
        let dir = TempDir::new().unwrap();
        write_raw(
            dir.path(),
            "now/bad.md",
            "---\nid: x\ntype: epic\nsummary: s\n---\n",
        );
        let err = MarkdownStore::new(dir.path())
            .list_all_work_items()
            .unwrap_err();
        assert!(matches!(err, StoreError::Yaml { .. }));
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn timestamps_accept_dates_and_rfc3339() {
        let dir = TempDir::new().unwrap();
        let path = write_raw(
            dir.path(),
            "now/t.md",
            "---\nid: t\ntype: update\nsummary: s\ncreated: 2024-03-01\nupdated: 2024-03-02T10:00:00Z\n---\n",
        );
        let item = MarkdownStore::new(dir.path())
            .read_item(&path, Some("now"))
            .unwrap();
        assert_eq!(
            item.created.unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
        assert_eq!(
            item.updated.unwrap().to_rfc3339(),
            "2024-03-02T10:00:00+00:00"
        );
    }

    #[test]
    fn write_then_read_preserves_fields_and_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_raw(
            dir.path(),
            "now/x.md",
            "---\nid: x\ntype: proposal\nsummary: Try rust\nowner: sam\ngit_branch: feat/x\n---\n\nOriginal body\n",
        );
        let store = MarkdownStore::new(dir.path());
        let mut item = store.read_item(&path, Some("now")).unwrap();
        assert_eq!(item.extra.len(), 2);

        item.technical_tags = vec!["Rust".into(), "cli".into()];
        item.related_items.push("y".into());
        item.content.push_str("\nMore\n");
        store.write_work_item(&item).unwrap();

        let reread = store.read_item(&path, Some("now")).unwrap();
        assert_eq!(reread, item);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("---\nid: x\n"));
        assert!(raw.contains("owner: sam"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = MarkdownStore::new(dir.path());
        let mut item = WorkItem::new("n", ItemType::Analysis, "New", Schedule::Later);
        item.path = store.archive_dir().join("merged-n.md");
        store.write_work_item(&item).unwrap();
        assert!(dir.path().join("merged/merged-n.md").is_file());
    }

    #[test]
    fn create_never_replaces_an_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = MarkdownStore::new(dir.path());
        let existing = write_raw(dir.path(), "merged/merged-a.md", "keep me");

        let mut item = WorkItem::new("a", ItemType::Plan, "A", Schedule::Now);
        item.path = existing.clone();
        assert!(store.path_exists(&existing));
        assert!(store.create_work_item(&item).is_err());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");

        item.path = store.archive_dir().join("merged-a-2.md");
        assert!(!store.path_exists(&item.path));
        store.create_work_item(&item).unwrap();
        assert!(store.path_exists(&item.path));
    }

    #[test]
    fn remove_tolerates_missing_files() {
        let dir = TempDir::new().unwrap();
        let store = MarkdownStore::new(dir.path());
        let path = write_raw(dir.path(), "now/gone.md", "x");
        store.remove_work_item(&path).unwrap();
        assert!(!path.exists());
        store.remove_work_item(&path).unwrap();
    }

    #[test]
    fn open_requires_items_directory() {
        let dir = TempDir::new().unwrap();
        let err = MarkdownStore::open(dir.path(), &StorageConfig::default()).unwrap_err();
        assert!(matches!(err, StoreError::MissingItemsDir(_)));

        fs::create_dir_all(dir.path().join("items")).unwrap();
        let store = MarkdownStore::open(dir.path(), &StorageConfig::default()).unwrap();
        assert_eq!(store.items_root(), dir.path().join("items"));
        assert_eq!(
            store.bucket_path(Schedule::Now, "a.md"),
            dir.path().join("items/now/a.md")
        );
    }
}
