pub mod document;
pub mod error;
pub mod llm;
pub mod utils;
pub mod vector;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
