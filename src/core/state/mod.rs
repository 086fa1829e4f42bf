pub mod run_context;

pub use run_context::RunContext;
