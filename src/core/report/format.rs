use chrono::{DateTime, FixedOffset};

use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::mirror::{file_name, MirrorList};

const BINARY_UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
const DISPLAY_OFFSET_SECS: i32 = 8 * 3600;

/// Binary-unit size with two decimals, e.g. `1.50 GiB`.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BINARY_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, BINARY_UNITS[unit])
}

/// A record timestamp as shown in listings.
#[derive(Debug, Clone, Copy)]
pub struct DisplayDate(DateTime<FixedOffset>);

impl DisplayDate {
    pub fn parse(recorded_at: &str) -> ArchiveResult<Self> {
        let offset = FixedOffset::east_opt(DISPLAY_OFFSET_SECS)
            .ok_or_else(|| ArchiveError::Config("invalid display offset".into()))?;
        let parsed = DateTime::parse_from_rfc3339(recorded_at).map_err(|e| {
            ArchiveError::SchemaDrift(format!("invalid timestamp '{}': {}", recorded_at, e))
        })?;
        Ok(Self(parsed.with_timezone(&offset)))
    }

    /// `yyyy/MM/dd HH:mm:ss` in UTC+8.
    pub fn label(&self) -> String {
        self.0.format("%Y/%m/%d %H:%M:%S").to_string()
    }

    /// Epoch seconds rounded up.
    pub fn epoch_ceil(&self) -> i64 {
        let secs = self.0.timestamp();
        if self.0.timestamp_subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Markdown link to a file, with the mirror next to it when there is one.
pub fn file_link(url: &str, mirrors: &MirrorList) -> ArchiveResult<String> {
    let name = file_name(url)?;
    Ok(match mirrors.find(url) {
        Some(entry) => format!("{} [Orig]({}) / [Mirror]({})", name, url, entry.mirror),
        None => format!("[{}]({})", name, url),
    })
}

/// `|a|b|c|`
pub fn table_row<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row = String::from("|");
    for cell in cells {
        row.push_str(cell.as_ref());
        row.push('|');
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_use_binary_units_with_two_decimals() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 / 2), "1.50 GiB");
    }

    #[test]
    fn dates_render_in_utc_plus_eight() {
        let date = DisplayDate::parse("2025-01-01T20:30:00.250Z").unwrap();
        assert_eq!(date.label(), "2025/01/02 04:30:00");
        assert_eq!(date.epoch_ceil(), 1_735_763_401);

        let whole = DisplayDate::parse("2025-01-01T20:30:00.000Z").unwrap();
        assert_eq!(whole.epoch_ceil(), 1_735_763_400);
    }

    #[tokio::test]
    async fn file_link_mentions_mirror_when_known() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirrors = MirrorList::load(dir.path()).await.unwrap();
        mirrors
            .insert("https://cdn/a.zip?auth_key=x", "https://mirror/a.zip".into())
            .unwrap();

        assert_eq!(
            file_link("https://cdn/a.zip?auth_key=y", &mirrors).unwrap(),
            "a.zip [Orig](https://cdn/a.zip?auth_key=y) / [Mirror](https://mirror/a.zip)"
        );
        assert_eq!(
            file_link("https://cdn/b.zip", &mirrors).unwrap(),
            "[b.zip](https://cdn/b.zip)"
        );
    }
}
