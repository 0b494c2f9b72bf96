//! CLI commands

pub mod hierarchy;
pub mod populate;
pub mod status;

pub use hierarchy::HierarchyCommand;
pub use populate::PopulateCommand;
pub use status::StatusCommand;
