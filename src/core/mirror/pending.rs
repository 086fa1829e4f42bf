use std::collections::HashSet;

use super::list::canonical_url;
use crate::core::error::ArchiveResult;

/// A binary asset waiting to be mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRequest {
    pub url: String,
    /// Asset name on the mirror; defaults to the URL's file name.
    pub name: Option<String>,
    /// MD5 reported by the API, when known.
    pub checksum: Option<String>,
}

impl MirrorRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            checksum: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        let checksum = checksum.into();
        self.checksum = (!checksum.is_empty()).then_some(checksum);
        self
    }
}

/// Work collected during a run and dispatched once all archiving is done.
#[derive(Debug, Default)]
pub struct PendingMirrors {
    binaries: Vec<MirrorRequest>,
    web_pages: Vec<String>,
    checksums: HashSet<String>,
    canonical: HashSet<String>,
}

impl PendingMirrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a binary. Requests sharing a checksum, or pointing at the same
    /// file under another signature, are queued once.
    pub fn push_binary(&mut self, request: MirrorRequest) -> ArchiveResult<bool> {
        let canonical = canonical_url(&request.url)?;
        if self.canonical.contains(&canonical) {
            return Ok(false);
        }
        if let Some(sum) = &request.checksum {
            if !self.checksums.insert(sum.to_lowercase()) {
                return Ok(false);
            }
        }
        self.canonical.insert(canonical);
        self.binaries.push(request);
        Ok(true)
    }

    /// Queue a URL for the web archive.
    pub fn push_web_page(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !self.web_pages.contains(&url) {
            self.web_pages.push(url);
        }
    }

    pub fn binaries(&self) -> &[MirrorRequest] {
        &self.binaries
    }

    pub fn web_pages(&self) -> &[String] {
        &self.web_pages
    }

    pub fn is_empty(&self) -> bool {
        self.binaries.is_empty() && self.web_pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_checksum_is_queued_once() {
        let mut pending = PendingMirrors::new();
        assert!(pending
            .push_binary(MirrorRequest::new("https://cdn/a.zip").with_checksum("ABC"))
            .unwrap());
        assert!(!pending
            .push_binary(MirrorRequest::new("https://cdn/b.zip").with_checksum("abc"))
            .unwrap());
        assert_eq!(pending.binaries().len(), 1);
    }

    #[test]
    fn resigned_url_is_queued_once() {
        let mut pending = PendingMirrors::new();
        pending
            .push_binary(MirrorRequest::new("https://cdn/a.zip?auth_key=1"))
            .unwrap();
        pending
            .push_binary(MirrorRequest::new("https://cdn/a.zip?auth_key=2"))
            .unwrap();
        assert_eq!(pending.binaries().len(), 1);
    }

    #[test]
    fn empty_checksum_does_not_dedup() {
        let mut pending = PendingMirrors::new();
        pending.push_binary(MirrorRequest::new("https://cdn/a.zip").with_checksum("")).unwrap();
        pending.push_binary(MirrorRequest::new("https://cdn/b.zip").with_checksum("")).unwrap();
        assert_eq!(pending.binaries().len(), 2);
    }
}
