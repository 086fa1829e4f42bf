use tracing::{debug, info};

use crate::core::api::{GamePackage, GameQuery};
use crate::core::archive::layout;
use crate::core::archive::Observation;
use crate::core::error::ArchiveResult;
use crate::core::mirror::MirrorRequest;
use crate::core::report::format_bytes;
use crate::core::state::RunContext;

/// Fetch and archive the full build of every game target.
pub async fn archive_latest_games(ctx: &RunContext) -> ArchiveResult<()> {
    debug!("Fetching latestGame ...");
    for target in &ctx.config.targets.games {
        let query = GameQuery::latest(target);
        let payload = ctx.latest_game(&query).await?;
        let game = &payload.body;
        info!(
            "Fetched latestGame: {}, {}, v{}, {}",
            target.region,
            target.name,
            game.version,
            format_bytes(game.pkg.unpacked_size())
        );

        if target.mirror {
            enqueue_package(ctx, &game.pkg)?;
        }

        let observation = Observation::new(&query, payload.raw)?;
        ctx.store
            .save(
                &layout::game_dir(ctx.product(), &target.dir_name),
                &game.version,
                &observation,
                true,
                ctx.rules(),
            )
            .await?;
    }
    Ok(())
}

fn enqueue_package(ctx: &RunContext, pkg: &GamePackage) -> ArchiveResult<()> {
    if !pkg.url.is_empty() {
        ctx.enqueue_binary(MirrorRequest::new(&pkg.url).with_checksum(&pkg.md5))?;
    }
    for pack in &pkg.packs {
        ctx.enqueue_binary(MirrorRequest::new(&pack.url).with_checksum(&pack.md5))?;
    }
    Ok(())
}
