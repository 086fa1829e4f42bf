use super::format::{file_link, format_bytes, table_row, DisplayDate};
use crate::core::api::{parse_size, LatestGame, PackFile};
use crate::core::archive::StoredRecord;
use crate::core::error::ArchiveResult;
use crate::core::mirror::MirrorList;

struct Section {
    title: String,
    anchor: String,
    unpacked: u64,
    packed: u64,
    rows: Vec<String>,
}

fn size_table(unpacked: u64, packed: u64) -> [String; 4] {
    [
        "<table>".to_string(),
        format!(
            "  <tr><td>Unpacked Size</td><td style=\"text-align: right;\"><b>{}</b></td></tr>",
            format_bytes(unpacked)
        ),
        format!(
            "  <tr><td>Packed Size</td><td style=\"text-align: right;\"><b>{}</b></td></tr>",
            format_bytes(packed)
        ),
        "</table>\n".to_string(),
    ]
}

fn file_row(url: &str, md5: &str, size: &str, mirrors: &MirrorList) -> ArchiveResult<String> {
    Ok(table_row([
        file_link(url, mirrors)?,
        format!("`{}`", md5),
        format_bytes(parse_size(size)),
    ]))
}

fn pack_rows(packs: &[PackFile], mirrors: &MirrorList) -> ArchiveResult<Vec<String>> {
    packs
        .iter()
        .map(|p| file_row(&p.url, &p.md5, &p.package_size, mirrors))
        .collect()
}

fn render(heading: String, sections: Vec<Section>) -> String {
    let mut lines = vec![heading];
    for s in &sections {
        lines.push(format!("- [{}](#{})", s.title, s.anchor));
    }
    lines.push(String::new());

    for s in sections {
        lines.push(format!("<h2 id=\"{}\">{}</h2>\n", s.anchor, s.title));
        lines.extend(size_table(s.unpacked, s.packed));
        lines.push("|File|MD5 Checksum|Size|".to_string());
        lines.push("|:--|:--|--:|".to_string());
        lines.extend(s.rows);
        lines.push(String::new());
    }
    lines.join("\n")
}

/// `game/<dir>/list.md`: one section per full build record.
pub fn render_game_list(
    target_name: &str,
    records: &[StoredRecord],
    mirrors: &MirrorList,
) -> ArchiveResult<String> {
    let mut sections = Vec::with_capacity(records.len());
    for record in records {
        let game: LatestGame = serde_json::from_value(record.response.clone())?;
        let date = DisplayDate::parse(&record.recorded_at)?;
        sections.push(Section {
            title: format!("{} ({})", game.version, date.label()),
            anchor: format!("ver-{}-{}", game.version, date.epoch_ceil()),
            unpacked: game.pkg.unpacked_size(),
            packed: game.pkg.packed_size(),
            rows: pack_rows(&game.pkg.packs, mirrors)?,
        });
    }
    Ok(render(format!("# Game Packages ({})\n", target_name), sections))
}

/// `game/<dir>/list_patch.md`: one section per `from → to` patch record.
pub fn render_patch_list(
    target_name: &str,
    records: &[StoredRecord],
    mirrors: &MirrorList,
) -> ArchiveResult<String> {
    let mut sections = Vec::new();
    for record in records {
        let game: LatestGame = serde_json::from_value(record.response.clone())?;
        let Some(patch) = game.patch else {
            continue;
        };
        let date = DisplayDate::parse(&record.recorded_at)?;

        let mut rows = Vec::new();
        if !patch.url.is_empty() {
            rows.push(file_row(&patch.url, &patch.md5, &patch.package_size, mirrors)?);
        }
        rows.extend(pack_rows(&patch.patches, mirrors)?);

        sections.push(Section {
            title: format!("{} → {} ({})", game.request_version, game.version, date.label()),
            anchor: format!(
                "ver-{}-{}-{}",
                game.request_version,
                game.version,
                date.epoch_ceil()
            ),
            unpacked: patch.unpacked_size(),
            packed: patch.packed_size(),
            rows,
        });
    }
    Ok(render(
        format!("# Game Patch Packages ({})\n", target_name),
        sections,
    ))
}
