// kings-core/src/api/mod.rs

pub mod client;
pub mod errors;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::KingsApiClient;
pub use errors::ApiError;
pub use traits::TokenApi;
pub use types::{time_range_label, EvalMode, Filters, MigratedFilter, ProgressEvaluation};
