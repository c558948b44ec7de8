//! Document export.

pub mod pdf;

pub use pdf::{
    DocumentLayout, PageGeometry, PdfExporter, REPORT_FILE_NAME, REPORT_MIME_TYPE, layout,
};
