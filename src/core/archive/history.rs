use std::path::{Path, PathBuf};

use super::files;
use super::record::{Observation, StoredRecord};
use crate::core::diff::{self, IgnoreRule};
use crate::core::error::ArchiveResult;

/// An append-only, discovery-ordered sequence of [`StoredRecord`]s backed by
/// one JSON file (`all.json`, `all_patch.json`).
#[derive(Debug)]
pub struct History {
    path: PathBuf,
    records: Vec<StoredRecord>,
    dirty: bool,
}

impl History {
    /// Load the file, or start empty when it does not exist yet.
    pub async fn load(path: impl Into<PathBuf>) -> ArchiveResult<Self> {
        let path = path.into();
        let records = files::read_json_opt(&path).await?.unwrap_or_default();
        Ok(Self {
            path,
            records,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose `(req, rsp)` is equivalent to `observation`.
    pub fn find_equivalent(
        &self,
        observation: &Observation,
        rules: &[IgnoreRule],
    ) -> Option<&StoredRecord> {
        let candidate = observation.to_value();
        self.records
            .iter()
            .find(|r| diff::equivalent(&r.observation_value(), &candidate, rules))
    }

    /// Append unless an equivalent record exists. Returns whether it was appended.
    pub fn insert(&mut self, observation: &Observation, rules: &[IgnoreRule]) -> bool {
        if self.find_equivalent(observation, rules).is_some() {
            return false;
        }
        self.records.push(StoredRecord::recorded_now(observation));
        self.dirty = true;
        true
    }

    /// Write the whole sequence if it changed.
    pub async fn persist(&mut self) -> ArchiveResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        files::write_json(&self.path, &self.records).await?;
        self.dirty = false;
        Ok(true)
    }
}
