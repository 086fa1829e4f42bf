// ─── Fetch Orchestrator ───
// One module per archive step. Steps run in order, each reading what the
// previous ones persisted:
//   games     → full builds          (game/<dir>)
//   patches   → patches to latest    (game/<dir>/all_patch.json)
//   resources → resource manifests   (game_resources/<channel>/<platform>)
//   raw       → manifest companions  (raw/<host>/...)
//   launcher  → launcher zip + exe   (launcher/, launcherExe/)

pub mod games;
pub mod launcher;
pub mod patches;
pub mod raw;
pub mod resources;

#[cfg(test)]
pub(crate) mod testing;

pub use games::archive_latest_games;
pub use launcher::archive_launchers;
pub use patches::archive_game_patches;
pub use raw::archive_raw_resources;
pub use resources::archive_game_resources;

use crate::core::error::ArchiveResult;
use crate::core::state::RunContext;

/// Run every fetch step in dependency order.
pub async fn run_all(ctx: &RunContext) -> ArchiveResult<()> {
    archive_latest_games(ctx).await?;
    archive_game_patches(ctx).await?;
    archive_game_resources(ctx).await?;
    archive_raw_resources(ctx).await?;
    archive_launchers(ctx).await?;
    Ok(())
}
