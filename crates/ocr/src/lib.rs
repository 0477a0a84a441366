/// Compile a regex once and cache it for the life of the process.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod address;
pub mod datetime;
pub mod hash;
pub mod items;
pub mod lexicon;
pub mod merge;
pub mod pipeline;
pub mod preprocess;
pub mod price;
pub mod recognizer;
pub mod skew;
pub mod store;
pub mod text;
pub mod total;
pub mod types;

pub use merge::merge_lines;
pub use pipeline::{assemble, OcrOutcome, PipelineError, ReceiptPipeline};
pub use preprocess::{deskew, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use types::{Detection, TextLine};
