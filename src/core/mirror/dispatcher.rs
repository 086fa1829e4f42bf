use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use super::list::{MirrorList, WaybackLedger};
use super::pending::{MirrorRequest, PendingMirrors};
use crate::core::error::ArchiveResult;

/// Republishes a binary and returns its stable public URL.
#[async_trait]
pub trait MirrorSink: Send + Sync {
    async fn mirror(&self, request: &MirrorRequest) -> ArchiveResult<String>;
}

/// Submits a URL to a web archive and returns the permanent snapshot URL.
#[async_trait]
pub trait ArchivalSink: Send + Sync {
    async fn archive(&self, url: &str) -> ArchiveResult<String>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub mirrored: usize,
    pub already_mirrored: usize,
    pub archived: usize,
    pub already_archived: usize,
}

/// Forwards collected URLs to the configured sinks, recording results in
/// `mirror_file_list.json` and `wayback_machine.json` under `root`.
pub struct MirrorDispatcher<'a> {
    root: &'a Path,
    binary_sink: Option<&'a dyn MirrorSink>,
    archival_sink: Option<&'a dyn ArchivalSink>,
}

impl<'a> MirrorDispatcher<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            binary_sink: None,
            archival_sink: None,
        }
    }

    pub fn with_binary_sink(mut self, sink: &'a dyn MirrorSink) -> Self {
        self.binary_sink = Some(sink);
        self
    }

    pub fn with_archival_sink(mut self, sink: &'a dyn ArchivalSink) -> Self {
        self.archival_sink = Some(sink);
        self
    }

    /// Dispatch everything in `pending`, one item at a time.
    ///
    /// The lists are persisted after each successful item so a failing sink
    /// never loses earlier uploads.
    pub async fn dispatch(&self, pending: &PendingMirrors) -> ArchiveResult<DispatchReport> {
        let mut report = DispatchReport::default();

        match self.binary_sink {
            Some(sink) => self.dispatch_binaries(sink, pending, &mut report).await?,
            None if !pending.binaries().is_empty() => {
                info!(
                    "Binary mirror not configured, skipping {} files",
                    pending.binaries().len()
                );
            }
            None => {}
        }

        match self.archival_sink {
            Some(sink) => self.dispatch_web_pages(sink, pending, &mut report).await?,
            None if !pending.web_pages().is_empty() => {
                info!(
                    "Web archive not configured, skipping {} URLs",
                    pending.web_pages().len()
                );
            }
            None => {}
        }

        Ok(report)
    }

    async fn dispatch_binaries(
        &self,
        sink: &dyn MirrorSink,
        pending: &PendingMirrors,
        report: &mut DispatchReport,
    ) -> ArchiveResult<()> {
        let mut list = MirrorList::load(self.root).await?;
        for request in pending.binaries() {
            if list.find(&request.url).is_some() {
                debug!("Already mirrored: {}", request.url);
                report.already_mirrored += 1;
                continue;
            }
            let mirror_url = sink.mirror(request).await?;
            list.insert(&request.url, mirror_url)?;
            list.persist().await?;
            report.mirrored += 1;
        }
        Ok(())
    }

    async fn dispatch_web_pages(
        &self,
        sink: &dyn ArchivalSink,
        pending: &PendingMirrors,
        report: &mut DispatchReport,
    ) -> ArchiveResult<()> {
        let mut ledger = WaybackLedger::load(self.root).await?;
        for url in pending.web_pages() {
            if ledger.contains_original(url)? {
                report.already_archived += 1;
                continue;
            }
            let archived = sink.archive(url).await?;
            info!("Web archive saved: {}", archived);
            ledger.insert(archived);
            ledger.persist().await?;
            report.archived += 1;
        }
        Ok(())
    }
}
