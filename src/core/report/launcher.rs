use super::format::{file_link, format_bytes, table_row, DisplayDate};
use crate::core::api::{parse_size, LatestLauncher, LatestLauncherExe};
use crate::core::archive::{LauncherKind, StoredRecord};
use crate::core::config::{LauncherApp, Region};
use crate::core::error::ArchiveResult;
use crate::core::mirror::MirrorList;

/// History of one launcher app in one region.
pub struct LauncherSection {
    pub region: Region,
    pub app: LauncherApp,
    pub records: Vec<StoredRecord>,
}

impl LauncherSection {
    fn anchor(&self) -> String {
        format!(
            "launcher-{}-{}",
            self.region.as_str(),
            self.app.as_str().to_lowercase()
        )
    }

    fn title(&self) -> String {
        format!("{} {}", self.region, self.app)
    }
}

fn zip_row(record: &StoredRecord, date: String, mirrors: &MirrorList) -> ArchiveResult<String> {
    let rsp: LatestLauncher = serde_json::from_value(record.response.clone())?;
    let packed = parse_size(&rsp.package_size);
    Ok(table_row([
        date,
        rsp.version.clone(),
        file_link(&rsp.zip_package_url, mirrors)?,
        format!("`{}`", rsp.md5),
        format_bytes(parse_size(&rsp.total_size).saturating_sub(packed)),
        format_bytes(packed),
    ]))
}

fn exe_row(record: &StoredRecord, date: String, mirrors: &MirrorList) -> ArchiveResult<String> {
    let rsp: LatestLauncherExe = serde_json::from_value(record.response.clone())?;
    Ok(table_row([
        date,
        rsp.version.clone(),
        file_link(&rsp.exe_url, mirrors)?,
        format_bytes(parse_size(&rsp.exe_size)),
    ]))
}

/// `launcher/list.md` or `launcherExe/list.md`.
pub fn render_launcher_list(
    kind: LauncherKind,
    sections: &[LauncherSection],
    mirrors: &MirrorList,
) -> ArchiveResult<String> {
    let (title, headers, align): (&str, &[&str], &[&str]) = match kind {
        LauncherKind::Zip => (
            "Launcher Packages (zip)",
            &["Date", "Version", "File", "MD5 Checksum", "Unpacked", "Packed"],
            &["---", "---", "---", "---", "--:", "--:"],
        ),
        LauncherKind::Exe => (
            "Launcher Packages (Installer)",
            &["Date", "Version", "File", "Size"],
            &["---", "---", "---", "--:"],
        ),
    };

    let mut lines = vec![format!("# {}\n", title)];
    for section in sections {
        lines.push(format!("- [{}](#{})", section.title(), section.anchor()));
    }
    lines.push(String::new());

    for section in sections {
        lines.push(format!(
            "<h2 id=\"{}\">{}</h2>\n",
            section.anchor(),
            section.title()
        ));
        lines.push(table_row(headers.iter()));
        lines.push(table_row(align.iter()));
        for record in &section.records {
            let date = DisplayDate::parse(&record.recorded_at)?.label();
            lines.push(match kind {
                LauncherKind::Zip => zip_row(record, date, mirrors)?,
                LauncherKind::Exe => exe_row(record, date, mirrors)?,
            });
        }
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}
