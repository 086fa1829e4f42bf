pub mod files;
pub mod history;
pub mod layout;
pub mod record;
pub mod store;

pub use history::History;
pub use layout::LauncherKind;
pub use record::{Observation, StoredRecord};
pub use store::{ArchiveStore, SaveOutcome};
