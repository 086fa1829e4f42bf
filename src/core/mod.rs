// ─── Launcher Archive Core ───
// Incremental archiver for a game launcher API.
//
// Architecture:
//   core/
//     config/     - YAML configuration, targets, credentials
//     api/        - Launcher API trait, HTTP client, typed payloads
//     diff/       - Structural JSON differ with ignore rules
//     archive/    - latest / v<version> / all files, history dedup
//     fetch/      - Archive steps (games, patches, resources, raw, launcher)
//     mirror/     - Pending mirrors, dispatcher, GitHub + Wayback sinks
//     report/     - Markdown listings
//     downloader/ - MD5 validated downloads
//     version/    - Semver ordering, build token extraction
//     state/      - Per-run context

pub mod api;
pub mod archive;
pub mod config;
pub mod diff;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod http;
pub mod mirror;
pub mod report;
pub mod state;
pub mod version;
