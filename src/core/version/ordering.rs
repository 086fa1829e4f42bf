use std::cmp::Ordering;

use semver::Version;

use crate::core::error::{ArchiveError, ArchiveResult};

pub fn parse(version: &str) -> ArchiveResult<Version> {
    Version::parse(version).map_err(|_| ArchiveError::InvalidVersion(version.to_string()))
}

/// Reject anything that is not a full `x.y.z` semver string.
pub fn ensure_semver(version: &str) -> ArchiveResult<()> {
    parse(version).map(|_| ())
}

/// Newest first. Strings that are not semver sort after valid ones, by text.
pub fn compare_desc(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(va), Ok(vb)) => vb.cmp(&va),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => b.cmp(a),
    }
}

/// Distinct versions, newest first.
pub fn distinct_desc<'a, I>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = Vec::new();
    for v in versions {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out.sort_by(|a, b| compare_desc(a, b));
    out
}

/// Versions that have a newer version to patch to: all but the newest.
pub fn patchable_versions<'a, I>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    distinct_desc(versions).into_iter().skip(1).collect()
}

/// `"1.2.3"` -> `"1.2"`.
pub fn minor_version(version: &str) -> ArchiveResult<String> {
    let v = parse(version)?;
    Ok(format!("{}.{}", v.major, v.minor))
}
