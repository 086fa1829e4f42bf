use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::api::{GamePackage, ResourceQuery};
use crate::core::archive::layout;
use crate::core::archive::{History, Observation};
use crate::core::config::ResourceTarget;
use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::state::RunContext;
use crate::core::version::{distinct_desc, extract_build_token, minor_version};

/// A historical game build, with what is needed to address its manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub version_minor: String,
    pub rand_str: String,
}

/// Distinct builds of a game history, newest first.
pub fn builds_from_history(history: &History) -> ArchiveResult<Vec<BuildInfo>> {
    let versions = distinct_desc(history.records().iter().filter_map(|r| r.response_str("version")));
    let mut builds = Vec::with_capacity(versions.len());
    for version in versions {
        let record = history
            .records()
            .iter()
            .rev()
            .find(|r| r.response_str("version") == Some(version.as_str()));
        let file_path = match record {
            Some(r) => package_of(&r.response, &version)?.file_path,
            None => String::new(),
        };
        builds.push(BuildInfo {
            version_minor: minor_version(&version)?,
            rand_str: extract_build_token(&file_path)?,
            version,
        });
    }
    Ok(builds)
}

fn package_of(response: &Value, version: &str) -> ArchiveResult<GamePackage> {
    response
        .get("pkg")
        .filter(|pkg| !pkg.is_null())
        .cloned()
        .map(serde_json::from_value::<GamePackage>)
        .transpose()?
        .ok_or_else(|| ArchiveError::SchemaDrift(format!("game record v{} has no pkg", version)))
}

/// Fetch the resource manifests of every archived build on every platform.
pub async fn archive_game_resources(ctx: &RunContext) -> ArchiveResult<()> {
    debug!("Fetching latestGameRes ...");
    for target in ResourceTarget::collect(&ctx.config.targets.games) {
        let games = ctx
            .store
            .history(&layout::game_dir(ctx.product(), &target.game_dir()))
            .await?;
        if games.is_empty() {
            warn!(
                "Skipping latestGameRes for {} channel {}: game/all.json not found",
                target.region, target.channel
            );
            continue;
        }
        let builds = builds_from_history(&games)?;

        for platform in &ctx.config.platforms {
            let dir = layout::game_resources_dir(ctx.product(), target.channel, *platform);
            // Only the newest build may replace latest.json.
            let mut write_latest = true;
            for build in &builds {
                let query = ResourceQuery {
                    region: target.region,
                    app_code: target.app_code.clone(),
                    game_version: build.version_minor.clone(),
                    version: build.version.clone(),
                    rand_str: build.rand_str.clone(),
                    platform: *platform,
                };
                let payload = ctx.latest_game_resources(&query).await?;
                info!(
                    "Fetched latestGameRes: {}, {}, v{}, {}",
                    target.region, platform, build.version, payload.body.res_version
                );

                let observation = Observation::new(&query, payload.raw)?;
                ctx.store
                    .save(&dir, &build.version, &observation, write_latest, ctx.rules())
                    .await?;
                write_latest = false;
            }
        }
    }
    Ok(())
}
