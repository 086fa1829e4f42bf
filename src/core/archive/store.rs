use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace};

use super::files;
use super::history::History;
use super::record::Observation;
use crate::core::diff::{self, DiffTree, IgnoreRule};
use crate::core::error::ArchiveResult;

pub const LATEST_FILE: &str = "latest.json";
pub const HISTORY_FILE: &str = "all.json";

/// File name holding the observation for one version.
pub fn version_file_name(version: &str) -> String {
    format!("v{}.json", version)
}

/// What a [`ArchiveStore::save`] call changed on disk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SaveOutcome {
    /// A new record was appended to `all.json`.
    pub appended: bool,
    /// `latest.json` / `v<version>.json` files that were created or overwritten.
    pub written: Vec<PathBuf>,
    /// Differences that caused an existing file to be overwritten.
    pub overwritten: Vec<(PathBuf, DiffTree)>,
}

enum WriteResult {
    Unchanged,
    Created,
    Overwritten(DiffTree),
}

/// Per-target archive rooted at the output directory.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    root: PathBuf,
}

impl ArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a target-resource pair, e.g. `["akEndfield", "launcher", "game", "6"]`.
    pub fn dir<S: AsRef<str>>(&self, sub_paths: &[S]) -> PathBuf {
        sub_paths
            .iter()
            .fold(self.root.clone(), |p, s| p.join(s.as_ref()))
    }

    /// Persist one observation.
    ///
    /// `v<version>.json` (and `latest.json` when `write_latest`) are written when
    /// missing or when their content differs under `rules`; `all.json` gets a new
    /// record only if no equivalent one exists.
    pub async fn save<S: AsRef<str>>(
        &self,
        sub_paths: &[S],
        version: &str,
        observation: &Observation,
        write_latest: bool,
        rules: &[IgnoreRule],
    ) -> ArchiveResult<SaveOutcome> {
        let base = self.dir(sub_paths);
        let mut outcome = SaveOutcome::default();

        let mut targets = vec![base.join(version_file_name(version))];
        if write_latest {
            targets.push(base.join(LATEST_FILE));
        }

        let candidate = observation.to_value();
        for path in targets {
            match self.write_if_changed(&path, &candidate, rules).await? {
                WriteResult::Unchanged => {}
                WriteResult::Created => outcome.written.push(path),
                WriteResult::Overwritten(delta) => {
                    outcome.written.push(path.clone());
                    outcome.overwritten.push((path, delta));
                }
            }
        }

        let mut history = History::load(base.join(HISTORY_FILE)).await?;
        outcome.appended = history.insert(observation, rules);
        history.persist().await?;

        Ok(outcome)
    }

    async fn write_if_changed(
        &self,
        path: &Path,
        candidate: &Value,
        rules: &[IgnoreRule],
    ) -> ArchiveResult<WriteResult> {
        match files::read_json_opt::<Value>(path).await? {
            None => {
                files::write_json(path, candidate).await?;
                Ok(WriteResult::Created)
            }
            Some(current) => {
                let delta = diff::diff(&current, candidate, rules);
                if delta.is_empty() {
                    return Ok(WriteResult::Unchanged);
                }
                debug!("{} changed fields in {:?}", delta.change_count(), path);
                trace!("Diff detected in {:?}: {}", path, delta.to_pretty_json());
                files::write_json(path, candidate).await?;
                Ok(WriteResult::Overwritten(delta))
            }
        }
    }

    /// Load the `all.json` of a target-resource pair (empty when absent).
    pub async fn history<S: AsRef<str>>(&self, sub_paths: &[S]) -> ArchiveResult<History> {
        History::load(self.dir(sub_paths).join(HISTORY_FILE)).await
    }
}
