use super::format::{table_row, DisplayDate};
use crate::core::api::{LatestGameResources, ResourceEntry};
use crate::core::archive::StoredRecord;
use crate::core::config::Platform;
use crate::core::error::ArchiveResult;
use crate::core::version::compare_desc;

fn resource_link(entry: Option<&ResourceEntry>) -> String {
    match entry {
        Some(e) => format!("[{}]({})", e.version, e.path),
        None => "-".to_string(),
    }
}

/// One row per distinct `res_version`, in discovery order.
struct ResVersionRow<'a> {
    first: &'a StoredRecord,
    body: LatestGameResources,
    game_versions: Vec<String>,
}

fn group_by_res_version(records: &[StoredRecord]) -> ArchiveResult<Vec<ResVersionRow<'_>>> {
    let mut rows: Vec<ResVersionRow<'_>> = Vec::new();
    for record in records {
        let body: LatestGameResources = serde_json::from_value(record.response.clone())?;
        let game_version = record
            .request
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        match rows.iter_mut().find(|r| r.body.res_version == body.res_version) {
            Some(row) => {
                if !row.game_versions.contains(&game_version) {
                    row.game_versions.push(game_version);
                }
            }
            None => rows.push(ResVersionRow {
                first: record,
                body,
                game_versions: vec![game_version],
            }),
        }
    }
    Ok(rows)
}

/// `game_resources/<channel>/list.md`. Platforms without a history are omitted.
pub fn render_resource_list(platforms: &[(Platform, Vec<StoredRecord>)]) -> ArchiveResult<String> {
    let mut lines = vec!["# Game Resources\n".to_string()];
    for platform in Platform::ALL {
        lines.push(format!("- [{}](#res-{})", platform, platform));
    }
    lines.push(String::new());

    for (platform, records) in platforms {
        lines.push(format!("<h2 id=\"res-{}\">{}</h2>\n", platform, platform));
        lines.push("|Date|Initial|Main|Kick|Game version|".to_string());
        lines.push("|--|--|--|--|--|".to_string());

        for mut row in group_by_res_version(records)? {
            row.game_versions.sort_by(|a, b| compare_desc(a, b));
            let kick = if row.body.kick_flag() { "✅" } else { "" };
            lines.push(table_row([
                DisplayDate::parse(&row.first.recorded_at)?.label(),
                resource_link(row.body.resource("initial")),
                resource_link(row.body.resource("main")),
                kick.to_string(),
                row.game_versions.join(", "),
            ]));
        }
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(game_version: &str, res_version: &str, kick: bool) -> StoredRecord {
        StoredRecord {
            recorded_at: "2025-01-01T00:00:00.000Z".into(),
            request: json!({"appCode": "a", "gameVersion": "1.0", "version": game_version}),
            response: json!({
                "resources": [
                    {"name": "initial", "version": "i-1", "path": "https://res/initial"},
                    {"name": "main", "version": "m-1", "path": "https://res/main"}
                ],
                "configs": format!("{{\"kick_flag\": {}}}", kick),
                "res_version": res_version
            }),
        }
    }

    #[test]
    fn rows_group_game_versions_by_res_version() {
        let records = vec![
            record("1.0.13", "r1", false),
            record("1.0.14", "r1", false),
            record("1.0.14", "r2", true),
        ];
        let md = render_resource_list(&[(Platform::Windows, records)]).unwrap();

        assert!(md.contains("- [iOS](#res-iOS)"));
        assert!(md.contains("<h2 id=\"res-Windows\">Windows</h2>"));
        assert!(md.contains(
            "|2025/01/01 08:00:00|[i-1](https://res/initial)|[m-1](https://res/main)||1.0.14, 1.0.13|"
        ));
        assert!(md.contains("|✅|1.0.14|"));
        assert!(!md.contains("res-Android\">"));
    }
}
