//! Session operations split into focused modules.

mod browse;
mod dir_ops;
mod download;
mod export;
mod upload;

pub use download::DownloadedFile;
pub use upload::UploadReport;
