use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::cli::Commands;
use crate::core::api::HttpLauncherApi;
use crate::core::archive::ArchiveStore;
use crate::core::config::{AppConfig, AuthConfig};
use crate::core::downloader::Downloader;
use crate::core::error::ArchiveResult;
use crate::core::fetch;
use crate::core::http::build_http_client;
use crate::core::mirror::{GithubReleaseSink, MirrorDispatcher, WaybackSink};
use crate::core::report::{self, format_bytes};
use crate::core::state::RunContext;

pub async fn execute(command: Commands, config_path: &Path, auth_path: &Path) -> ArchiveResult<()> {
    match command {
        Commands::Archive { output_dir } => archive(config_path, auth_path, &output_dir).await,
    }
}

/// One full archive run: fetch steps, then mirroring, then listings.
pub async fn archive(config_path: &Path, auth_path: &Path, output_dir: &Path) -> ArchiveResult<()> {
    let config = AppConfig::load(config_path)?;
    let auth = AuthConfig::load(auth_path)?;

    let client = build_http_client(&config.network)?;
    let downloader = Downloader::new(client.clone(), config.network.retry_count);
    let api = Arc::new(HttpLauncherApi::new(client.clone(), &config));
    let store = ArchiveStore::new(output_dir);
    let ctx = RunContext::new(config, store, api, Arc::new(downloader.clone()))?;

    fetch::run_all(&ctx).await?;

    // ── Mirroring ───────────────────────────────────────
    let pending = ctx.take_pending();
    let github = auth
        .github
        .map(|gh| GithubReleaseSink::new(downloader.clone(), gh));
    let wayback = auth.wayback.map(|wb| WaybackSink::new(client.clone(), wb));

    let mut dispatcher = MirrorDispatcher::new(ctx.store.root());
    if let Some(sink) = &github {
        dispatcher = dispatcher.with_binary_sink(sink);
    }
    if let Some(sink) = &wayback {
        dispatcher = dispatcher.with_archival_sink(sink);
    }
    let dispatched = dispatcher.dispatch(&pending).await?;
    info!(
        "Mirrored {} new files ({} already mirrored), archived {} pages",
        dispatched.mirrored, dispatched.already_mirrored, dispatched.archived
    );
    if let Some(sink) = &github {
        info!(
            "GitHub Releases size total: {}",
            format_bytes(sink.release_size().await?)
        );
    }

    // ── Listings ────────────────────────────────────────
    report::write_reports(&ctx.store, &ctx.config).await?;
    Ok(())
}
