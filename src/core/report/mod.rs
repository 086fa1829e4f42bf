// ─── Report Generator ───
// Markdown listings rendered from the archive histories after mirroring,
// so file links can point at the mirrors uploaded in the same run.

pub mod format;
pub mod game;
pub mod launcher;
pub mod resources;

use tracing::debug;

use crate::core::archive::layout::{self, LauncherKind, PATCH_HISTORY_FILE};
use crate::core::archive::{files, ArchiveStore, History};
use crate::core::config::{AppConfig, ResourceTarget};
use crate::core::error::ArchiveResult;
use crate::core::mirror::MirrorList;

pub use format::format_bytes;
pub use launcher::LauncherSection;

const LIST_FILE: &str = "list.md";
const PATCH_LIST_FILE: &str = "list_patch.md";

/// Render every listing below the archive root.
pub async fn write_reports(store: &ArchiveStore, config: &AppConfig) -> ArchiveResult<()> {
    let mirrors = MirrorList::load(store.root()).await?;
    let product = config.product.as_str();

    for target in &config.targets.games {
        let dir = layout::game_dir(product, &target.dir_name);

        let games = store.history(&dir).await?;
        if !games.is_empty() {
            let md = game::render_game_list(&target.name, games.records(), &mirrors)?;
            write_markdown(store, &dir, LIST_FILE, &md).await?;
        }

        let patches = History::load(store.dir(&dir).join(PATCH_HISTORY_FILE)).await?;
        if !patches.is_empty() {
            let md = game::render_patch_list(&target.name, patches.records(), &mirrors)?;
            write_markdown(store, &dir, PATCH_LIST_FILE, &md).await?;
        }
    }

    for target in ResourceTarget::collect(&config.targets.games) {
        let mut platforms = Vec::new();
        for platform in &config.platforms {
            let history = store
                .history(&layout::game_resources_dir(product, target.channel, *platform))
                .await?;
            if !history.is_empty() {
                platforms.push((*platform, history.records().to_vec()));
            }
        }
        let md = resources::render_resource_list(&platforms)?;
        let dir = layout::game_resources_root(product, target.channel);
        write_markdown(store, &dir, LIST_FILE, &md).await?;
    }

    for kind in [LauncherKind::Zip, LauncherKind::Exe] {
        let mut sections = Vec::new();
        for target in &config.targets.launchers {
            for app in &target.apps {
                let history = store
                    .history(&layout::launcher_dir(product, kind, *app, target.channel))
                    .await?;
                if history.is_empty() {
                    continue;
                }
                sections.push(LauncherSection {
                    region: target.region,
                    app: *app,
                    records: history.records().to_vec(),
                });
            }
        }
        let md = launcher::render_launcher_list(kind, &sections, &mirrors)?;
        write_markdown(store, &layout::launcher_kind_root(product, kind), LIST_FILE, &md).await?;
    }

    Ok(())
}

async fn write_markdown(
    store: &ArchiveStore,
    dir: &[String],
    name: &str,
    md: &str,
) -> ArchiveResult<()> {
    let path = store.dir(dir).join(name);
    debug!("Writing {:?}", path);
    files::write_bytes(&path, md.as_bytes()).await
}
