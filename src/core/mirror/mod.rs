// ─── Mirror Dispatcher ───
// URLs of newly discovered binaries are collected while archiving and
// forwarded to the sinks in one pass once every fetch step is done.

pub mod dispatcher;
pub mod github;
pub mod list;
pub mod pending;
pub mod wayback;

pub use dispatcher::{ArchivalSink, DispatchReport, MirrorDispatcher, MirrorSink};
pub use github::GithubReleaseSink;
pub use list::{canonical_url, file_name, MirrorEntry, MirrorList, WaybackLedger};
pub use pending::{MirrorRequest, PendingMirrors};
pub use wayback::WaybackSink;
