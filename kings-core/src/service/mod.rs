pub mod analytics;
pub mod errors;
pub mod poller;
pub mod rating;

pub use analytics::{AnalyticsReport, AnalyticsService};
pub use errors::ServiceError;
pub use poller::{RefreshOutcome, TokenPoller};
pub use rating::{
    validate_progress_rating, validate_token_rating, RatingService, PROGRESS_RATING_SCALE,
    TOKEN_RATING_SCALE,
};
