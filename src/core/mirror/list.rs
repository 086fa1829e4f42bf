use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::archive::files;
use crate::core::error::ArchiveResult;

pub const MIRROR_LIST_FILE: &str = "mirror_file_list.json";
pub const WAYBACK_LIST_FILE: &str = "wayback_machine.json";

/// `url` without query string and fragment. Signed URLs of the same file
/// only differ in their query.
pub fn canonical_url(url: &str) -> ArchiveResult<String> {
    let mut parsed = Url::parse(url)?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

/// Last non-empty path segment of `url`.
pub fn file_name(url: &str) -> ArchiveResult<String> {
    let parsed = Url::parse(url)?;
    Ok(parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string())
}

/// Original → mirror mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEntry {
    /// Canonical original URL.
    pub orig: String,
    pub mirror: String,
}

/// Persistent, append-only list of mirrored files.
#[derive(Debug)]
pub struct MirrorList {
    path: PathBuf,
    entries: Vec<MirrorEntry>,
}

impl MirrorList {
    pub async fn load(root: &Path) -> ArchiveResult<Self> {
        let path = root.join(MIRROR_LIST_FILE);
        let entries = files::read_json_opt(&path).await?.unwrap_or_default();
        Ok(Self { path, entries })
    }

    pub fn entries(&self) -> &[MirrorEntry] {
        &self.entries
    }

    /// Mirror entry for any URL of the same file.
    pub fn find(&self, url: &str) -> Option<&MirrorEntry> {
        let canonical = canonical_url(url).ok()?;
        self.entries.iter().find(|e| e.orig == canonical)
    }

    /// Append a mapping unless the canonical original is already present.
    pub fn insert(&mut self, url: &str, mirror: String) -> ArchiveResult<bool> {
        let orig = canonical_url(url)?;
        if self.entries.iter().any(|e| e.orig == orig) {
            return Ok(false);
        }
        self.entries.push(MirrorEntry { orig, mirror });
        Ok(true)
    }

    pub async fn persist(&self) -> ArchiveResult<()> {
        files::write_json(&self.path, &self.entries).await
    }
}

/// `wayback_machine.json`: permanent web archive URLs.
#[derive(Debug)]
pub struct WaybackLedger {
    path: PathBuf,
    urls: Vec<String>,
}

impl WaybackLedger {
    pub async fn load(root: &Path) -> ArchiveResult<Self> {
        let path = root.join(WAYBACK_LIST_FILE);
        let urls = files::read_json_opt(&path).await?.unwrap_or_default();
        Ok(Self { path, urls })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Whether a snapshot of this file (any signature) was recorded.
    pub fn contains_original(&self, url: &str) -> ArchiveResult<bool> {
        let canonical = canonical_url(url)?;
        Ok(self
            .urls
            .iter()
            .any(|archived| canonical_url(archived).map_or(false, |a| a.ends_with(&canonical))))
    }

    pub fn insert(&mut self, archived_url: String) -> bool {
        if self.urls.contains(&archived_url) {
            return false;
        }
        self.urls.push(archived_url);
        true
    }

    pub async fn persist(&self) -> ArchiveResult<()> {
        files::write_json(&self.path, &self.urls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_url_strips_query_and_fragment() {
        assert_eq!(
            canonical_url("https://cdn.example.com/a/b.zip?auth_key=1-2-3&x=y#frag").unwrap(),
            "https://cdn.example.com/a/b.zip"
        );
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("https://cdn/x/y/pack_01.zip?k=v").unwrap(), "pack_01.zip");
    }

    #[tokio::test]
    async fn mirror_list_matches_any_signature_of_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = MirrorList::load(dir.path()).await.unwrap();
        assert!(list
            .insert("https://cdn/f.zip?auth_key=A", "https://mirror/f.zip".into())
            .unwrap());
        assert!(!list
            .insert("https://cdn/f.zip?auth_key=B", "https://mirror/other".into())
            .unwrap());
        list.persist().await.unwrap();

        let reloaded = MirrorList::load(dir.path()).await.unwrap();
        assert_eq!(
            reloaded.find("https://cdn/f.zip?auth_key=C").map(|e| e.mirror.as_str()),
            Some("https://mirror/f.zip")
        );
    }

    #[tokio::test]
    async fn wayback_ledger_recognizes_archived_originals() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = WaybackLedger::load(dir.path()).await.unwrap();
        ledger.insert("https://web.archive.org/web/20250101000000/https://cdn/l.exe".into());
        assert!(ledger.contains_original("https://cdn/l.exe?auth_key=Z").unwrap());
        assert!(!ledger.contains_original("https://cdn/other.exe").unwrap());
    }
}
