pub mod build_token;
pub mod ordering;

pub use build_token::extract_build_token;
pub use ordering::{
    compare_desc, distinct_desc, ensure_semver, minor_version, patchable_versions,
};
