pub mod podium;
pub mod scorer;

pub use podium::{rank_by_reserve, rank_by_score, Podium, PodiumSlot};
pub use scorer::{king_score, VOLUME_DIVISOR};
