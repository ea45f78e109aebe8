pub mod pdf;
pub mod storage;

pub use pdf::{EXTRACTION_FAILED, extract_text};
