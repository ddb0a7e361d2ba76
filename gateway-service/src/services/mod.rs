pub mod metrics;
pub mod providers;
pub mod staging;

pub use metrics::{get_metrics, init_metrics};
pub use staging::{StagedFile, UploadStore};
