use regex::Regex;

use crate::core::error::ArchiveResult;

/// One matcher in a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Matches any single key or array index.
    Wildcard,
}

impl Segment {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == key,
            Segment::Wildcard => true,
        }
    }
}

/// A field path such as `rsp.pkg.packs.*.url`, matched segment-for-segment
/// against the concrete path of a value inside a JSON tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a dot separated path; `*` becomes a wildcard.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "*" => Segment::Wildcard,
                lit => Segment::Literal(lit.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// True when the pattern has the same length as `path` and every segment matches.
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.segments.len() == path.len()
            && self
                .segments
                .iter()
                .zip(path)
                .all(|(seg, key)| seg.matches(key.as_ref()))
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => lit.as_str(),
                Segment::Wildcard => "*",
            })
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Masks a volatile substring of string values found at `path` before comparison.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pub path: PathPattern,
    pub pattern: Regex,
}

impl IgnoreRule {
    pub fn new(path: &str, pattern: &str) -> ArchiveResult<Self> {
        Ok(Self {
            path: PathPattern::parse(path),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Remove every occurrence of the pattern.
    pub fn normalize<'a>(&self, value: &'a str) -> std::borrow::Cow<'a, str> {
        self.pattern.replace_all(value, "")
    }
}

/// Signed download query parameter attached to every package URL.
pub const AUTH_KEY_PATTERN: &str = r"[?&]auth_key=[^&]+";

/// Rules that keep re-signed package URLs from registering as changes.
pub fn default_ignore_rules() -> ArchiveResult<Vec<IgnoreRule>> {
    [
        "rsp.pkg.url",
        "rsp.pkg.packs.*.url",
        "rsp.patch.url",
        "rsp.patch.patches.*.url",
        "rsp.zip_package_url",
        "rsp.exe_url",
    ]
    .into_iter()
    .map(|path| IgnoreRule::new(path, AUTH_KEY_PATTERN))
    .collect()
}
