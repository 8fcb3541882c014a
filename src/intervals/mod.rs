pub mod error;
pub mod segmenter;
