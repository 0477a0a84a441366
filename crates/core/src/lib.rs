pub mod config;
pub mod record;

pub use config::PipelineConfig;
pub use record::{ReceiptItem, ReceiptRecord};
