use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};
use url::Url;

use crate::core::api::LatestGameResources;
use crate::core::archive::files;
use crate::core::archive::layout::{self, RAW_DIR};
use crate::core::config::ResourceTarget;
use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::state::RunContext;

/// Companion files published next to every resource manifest path.
pub const RAW_FILE_NAMES: [&str; 5] = [
    "index_initial.json",
    "index_main.json",
    "pref_initial.json",
    "pref_main.json",
    "patch.json",
];

/// A companion file and where it is mirrored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub url: String,
    pub dest: PathBuf,
}

impl RawFile {
    /// `<root>/raw/<host>/<path segments>` of `<base>/<name>`, query stripped.
    pub fn new(root: &Path, base: &str, name: &str) -> ArchiveResult<Self> {
        let mut base_url = Url::parse(base)?;
        base_url.set_query(None);
        base_url.set_fragment(None);
        let url = Url::parse(&format!(
            "{}/{}",
            base_url.as_str().trim_end_matches('/'),
            name
        ))?;
        let host = url
            .host_str()
            .ok_or_else(|| ArchiveError::SchemaDrift(format!("resource path without host: {}", base)))?
            .to_string();

        let mut dest = root.join(RAW_DIR).join(host);
        if let Some(segments) = url.path_segments() {
            for segment in segments.filter(|s| !s.is_empty()) {
                dest.push(segment);
            }
        }
        Ok(Self {
            url: url.to_string(),
            dest,
        })
    }
}

/// Distinct resource base paths across all resource histories, first-seen order.
async fn resource_paths(ctx: &RunContext) -> ArchiveResult<Vec<String>> {
    let mut paths: Vec<String> = Vec::new();
    for target in ResourceTarget::collect(&ctx.config.targets.games) {
        for platform in &ctx.config.platforms {
            let history = ctx
                .store
                .history(&layout::game_resources_dir(ctx.product(), target.channel, *platform))
                .await?;
            for record in history.records() {
                let body: LatestGameResources = serde_json::from_value(record.response.clone())?;
                for resource in body.resources {
                    if !paths.contains(&resource.path) {
                        paths.push(resource.path);
                    }
                }
            }
        }
    }
    Ok(paths)
}

async fn download(ctx: &RunContext, file: RawFile) -> ArchiveResult<bool> {
    if files::exists(&file.dest).await? {
        return Ok(false);
    }
    match ctx.assets().fetch_optional(&file.url).await? {
        Some(bytes) => {
            files::write_bytes(&file.dest, &bytes).await?;
            Ok(true)
        }
        None => {
            debug!("Skipping absent raw file: {}", file.url);
            Ok(false)
        }
    }
}

/// Mirror the companion files of every archived resource path.
///
/// Existing files are never downloaded again. Files the CDN answers 403/404
/// for are skipped; any other failure aborts.
pub async fn archive_raw_resources(ctx: &RunContext) -> ArchiveResult<usize> {
    debug!("Fetching raw game resources ...");
    let root = ctx.store.root();
    let mut raw_files = Vec::new();
    for base in resource_paths(ctx).await? {
        for name in RAW_FILE_NAMES {
            raw_files.push(RawFile::new(root, &base, name)?);
        }
    }

    let written = stream::iter(raw_files)
        .map(|file| download(ctx, file))
        .buffer_unordered(ctx.concurrency())
        .try_fold(0usize, |count, wrote| async move {
            Ok::<_, ArchiveError>(count + usize::from(wrote))
        })
        .await?;

    info!("Fetched raw game resources: {} files", written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive::{ArchiveStore, Observation};
    use crate::core::config::Platform;
    use crate::core::diff::default_ignore_rules;
    use crate::core::fetch::testing::{context_with_assets, official_only_config, FakeApi, FakeAssets};
    use serde_json::json;
    use std::sync::Arc;

    async fn seed_resources(root: &Path, path: &str) {
        let store = ArchiveStore::new(root);
        let obs = Observation::new(
            json!({"version": "1.0.0"}),
            json!({
                "resources": [{"name": "main", "version": "m1", "path": path}],
                "configs": "{}",
                "res_version": "r1"
            }),
        )
        .unwrap();
        store
            .save(
                &layout::game_resources_dir("akEndfield", 6, Platform::Windows),
                "1.0.0",
                &obs,
                true,
                &default_ignore_rules().unwrap(),
            )
            .await
            .unwrap();
    }

    fn config() -> crate::core::config::AppConfig {
        let mut config = official_only_config();
        config.platforms = vec![Platform::Windows];
        config
    }

    #[test]
    fn raw_file_maps_url_to_host_directory() {
        let file = RawFile::new(
            Path::new("/out"),
            "https://res.example.com/a/b/main?sig=1",
            "index_main.json",
        )
        .unwrap();
        assert_eq!(file.url, "https://res.example.com/a/b/main/index_main.json");
        assert_eq!(
            file.dest,
            Path::new("/out/raw/res.example.com/a/b/main/index_main.json")
        );
    }

    #[tokio::test]
    async fn absent_files_are_skipped_and_present_ones_written_once() {
        let dir = tempfile::tempdir().unwrap();
        seed_resources(dir.path(), "https://res.example.com/w/main").await;
        let mut assets = FakeAssets::default();
        assets.files.insert(
            "https://res.example.com/w/main/index_main.json".into(),
            b"{}".to_vec(),
        );
        let assets = Arc::new(assets);
        let api = Arc::new(FakeApi::default());

        let ctx = context_with_assets(dir.path(), config(), api.clone(), assets.clone());
        assert_eq!(archive_raw_resources(&ctx).await.unwrap(), 1);
        assert!(dir
            .path()
            .join("raw/res.example.com/w/main/index_main.json")
            .exists());
        assert_eq!(assets.requests.lock().unwrap().len(), 5);

        let ctx = context_with_assets(dir.path(), config(), api, assets.clone());
        assert_eq!(archive_raw_resources(&ctx).await.unwrap(), 0);
        assert_eq!(assets.requests.lock().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn other_failures_abort() {
        let dir = tempfile::tempdir().unwrap();
        seed_resources(dir.path(), "https://res.example.com/broken/main").await;
        let ctx = context_with_assets(
            dir.path(),
            config(),
            Arc::new(FakeApi::default()),
            Arc::new(FakeAssets::default()),
        );

        let err = archive_raw_resources(&ctx).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
    }
}
