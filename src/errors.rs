//! Error types shared by the parceldesk library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParcelError {
    #[error("Key-value store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF export failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Spreadsheet XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Spreadsheet export failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported export format: {0}. Supported formats: xlsx, pdf, csv")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ParcelError>;
