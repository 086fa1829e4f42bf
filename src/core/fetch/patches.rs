use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::core::api::{GamePatch, GameQuery};
use crate::core::archive::layout::{self, PATCH_HISTORY_FILE};
use crate::core::archive::{History, Observation};
use crate::core::config::GameTarget;
use crate::core::error::ArchiveResult;
use crate::core::mirror::MirrorRequest;
use crate::core::report::format_bytes;
use crate::core::state::RunContext;
use crate::core::version::patchable_versions;

/// Asset name of a patch file: its last three path segments joined by `_`.
pub fn patch_asset_name(url: &str) -> ArchiveResult<String> {
    let parsed = url::Url::parse(url)?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();
    let start = segments.len().saturating_sub(3);
    Ok(segments[start..].join("_"))
}

/// Look up the patch from every archived version to the current build.
///
/// Lookups run through a pool of `thread_count.network` requests; results are
/// merged in version order once the pool has drained, so the appended entries
/// do not depend on the pool width.
pub async fn archive_game_patches(ctx: &RunContext) -> ArchiveResult<()> {
    debug!("Fetching latestGamePatch ...");
    for target in &ctx.config.targets.games {
        archive_target_patches(ctx, target).await?;
    }
    Ok(())
}

async fn archive_target_patches(ctx: &RunContext, target: &GameTarget) -> ArchiveResult<()> {
    let dir = layout::game_dir(ctx.product(), &target.dir_name);
    let games = ctx.store.history(&dir).await?;
    if games.is_empty() {
        return Ok(());
    }
    let versions =
        patchable_versions(games.records().iter().filter_map(|r| r.response_str("version")));

    let lookups: Vec<_> = stream::iter(versions)
        .map(|version| async move {
            let query = GameQuery::patch_from(target, &version);
            let payload = ctx.latest_game(&query).await?;
            ArchiveResult::Ok((query, payload))
        })
        .buffered(ctx.concurrency())
        .collect()
        .await;

    let mut patches = History::load(ctx.store.dir(&dir).join(PATCH_HISTORY_FILE)).await?;
    for lookup in lookups {
        let (query, payload) = lookup?;
        let Some(patch) = &payload.body.patch else {
            continue;
        };
        let observation = Observation::new(&query, payload.raw.clone())?;
        if !patches.insert(&observation, ctx.rules()) {
            continue;
        }

        info!(
            "Fetched latestGamePatch: {}, {}, v{} -> v{}, {}",
            target.region,
            target.name,
            payload.body.request_version,
            payload.body.version,
            format_bytes(patch.unpacked_size())
        );
        if target.mirror {
            enqueue_patch(ctx, patch)?;
        }
    }

    patches.persist().await?;
    Ok(())
}

fn enqueue_patch(ctx: &RunContext, patch: &GamePatch) -> ArchiveResult<()> {
    let files = std::iter::once((&patch.url, &patch.md5))
        .filter(|(url, _)| !url.is_empty())
        .chain(patch.patches.iter().map(|p| (&p.url, &p.md5)));
    for (url, md5) in files {
        let request = MirrorRequest::new(url)
            .with_name(patch_asset_name(url)?)
            .with_checksum(md5);
        ctx.enqueue_binary(request)?;
    }
    Ok(())
}
