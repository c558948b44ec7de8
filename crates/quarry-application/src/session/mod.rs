//! Per-session state management.

mod registry;

pub use registry::SessionRegistry;
