pub mod credentials;
pub mod export;
pub mod paths;
pub mod storage;

pub use crate::credentials::resolve_credentials;
pub use crate::export::PdfExporter;
pub use crate::paths::QuarryPaths;
pub use crate::storage::ConfigStorage;
