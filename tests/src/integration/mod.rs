//! Cross-component integration tests.

pub mod concurrency;
pub mod flows;
