use tracing::{debug, info};

use crate::core::api::{LauncherExeQuery, LauncherQuery};
use crate::core::archive::layout::{self, LauncherKind};
use crate::core::archive::Observation;
use crate::core::error::ArchiveResult;
use crate::core::mirror::MirrorRequest;
use crate::core::state::RunContext;

/// Fetch and archive the launcher package and installer of every launcher app.
pub async fn archive_launchers(ctx: &RunContext) -> ArchiveResult<()> {
    debug!("Fetching latestLauncher ...");
    for target in &ctx.config.targets.launchers {
        for app in &target.apps {
            let zip_query = LauncherQuery::new(target, *app);
            let zip = ctx.latest_launcher(&zip_query).await?;
            let exe_query = LauncherExeQuery::new(target, *app);
            let exe = ctx.latest_launcher_exe(&exe_query).await?;
            info!(
                "Fetched latestLauncher: {}, v{}, {}",
                target.region, zip.body.version, app
            );

            if !zip.body.zip_package_url.is_empty() {
                ctx.enqueue_binary(
                    MirrorRequest::new(&zip.body.zip_package_url).with_checksum(&zip.body.md5),
                )?;
                ctx.enqueue_web_page(&zip.body.zip_package_url);
            }
            if !exe.body.exe_url.is_empty() {
                ctx.enqueue_binary(MirrorRequest::new(&exe.body.exe_url))?;
                ctx.enqueue_web_page(&exe.body.exe_url);
            }

            let zip_dir = layout::launcher_dir(ctx.product(), LauncherKind::Zip, *app, target.channel);
            let observation = Observation::new(&zip_query, zip.raw)?;
            ctx.store
                .save(&zip_dir, &zip.body.version, &observation, true, ctx.rules())
                .await?;

            let exe_dir = layout::launcher_dir(ctx.product(), LauncherKind::Exe, *app, target.channel);
            let observation = Observation::new(&exe_query, exe.raw)?;
            ctx.store
                .save(&exe_dir, &exe.body.version, &observation, true, ctx.rules())
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive::files;
    use crate::core::fetch::testing::{context, official_only_config, FakeApi};
    use serde_json::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn package_and_installer_are_archived_per_app() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::default());
        let ctx = context(dir.path(), official_only_config(), api.clone());

        archive_launchers(&ctx).await.unwrap();

        assert_eq!(
            api.calls(),
            [
                "launcher:EndField",
                "launcherExe:endfield",
                "launcher:Official",
                "launcherExe:official"
            ]
        );
        let base = dir.path().join("akEndfield/launcher");
        let zip: Value = files::read_json(&base.join("launcher/EndField/6/latest.json"))
            .await
            .unwrap();
        assert_eq!(zip["req"]["targetApp"], "EndField");
        assert_eq!(zip["req"]["subChannel"], 6);
        let exe: Value = files::read_json(&base.join("launcherExe/Official/6/v1.0.0.json"))
            .await
            .unwrap();
        assert_eq!(exe["req"]["ta"], "official");

        let pending = ctx.take_pending();
        assert_eq!(pending.binaries().len(), 4);
        assert_eq!(pending.web_pages().len(), 4);
    }

    #[tokio::test]
    async fn records_without_urls_are_saved_but_not_queued() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::default());
        *api.blank_launcher_urls.lock().unwrap() = true;
        let ctx = context(dir.path(), official_only_config(), api.clone());

        archive_launchers(&ctx).await.unwrap();

        let base = dir.path().join("akEndfield/launcher");
        assert!(base.join("launcher/EndField/6/latest.json").exists());
        assert!(base.join("launcherExe/Official/6/latest.json").exists());
        let pending = ctx.take_pending();
        assert!(pending.binaries().is_empty());
        assert!(pending.web_pages().is_empty());
    }

    #[tokio::test]
    async fn cached_requests_are_not_repeated_within_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::default());
        let ctx = context(dir.path(), official_only_config(), api.clone());

        archive_launchers(&ctx).await.unwrap();
        archive_launchers(&ctx).await.unwrap();

        assert_eq!(api.calls().len(), 4);
    }
}
