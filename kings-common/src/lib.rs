// kings-common/src/lib.rs
// Token Kings - pure aggregation and ranking core

pub mod analytics;
pub mod data;
pub mod ranking;

pub use data::types::{DataError, DataResult};
