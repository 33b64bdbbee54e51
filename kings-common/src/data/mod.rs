pub mod progress;
pub mod types;

pub use progress::{progress_steps, stalled_states, state_deltas, ProgressStep, StateDelta};
pub use types::{
    DataError, DataResult, RatedToken, Rating, RatingFilter, StateRecord, TokenMetadata,
    TokenSummary,
};
