use std::sync::OnceLock;

use regex::Regex;

use crate::core::error::{ArchiveError, ArchiveResult};

/// `pkg.file_path` ends in `..._<token>/<rest>`; the token addresses the
/// resource manifests of that build.
const BUILD_TOKEN_PATTERN: &str = r"_([^/]+)/.+?$";

fn build_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BUILD_TOKEN_PATTERN).expect("valid build token pattern"))
}

/// Extract the build random string from a package file path.
///
/// A miss means the upstream path layout changed; that is fatal because a
/// guessed token would address the wrong manifests.
pub fn extract_build_token(file_path: &str) -> ArchiveResult<String> {
    build_token_regex()
        .captures(file_path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ArchiveError::SchemaDrift(format!(
                "version rand_str not found in file_path '{}'",
                file_path
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_taken_from_underscore_segment() {
        let path = "https://cdn.example.com/game/6/1.0.14_xYz09AbC/files";
        assert_eq!(extract_build_token(path).unwrap(), "xYz09AbC");
    }

    #[test]
    fn missing_token_is_schema_drift() {
        let err = extract_build_token("https://cdn.example.com/game/files").unwrap_err();
        assert!(matches!(err, ArchiveError::SchemaDrift(_)));
    }
}
