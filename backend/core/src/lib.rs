pub mod document;
pub mod error;
pub mod retry;
pub mod traits;
pub mod types;

pub use document::{ExtractedDocument, NewsField};
pub use error::{BroadsheetError, Result};
pub use retry::{retry_external, with_timeout, RetryPolicy};
pub use traits::{FieldExtractor, OcrEngine};
pub use types::{Point, Region, TextFragment};
