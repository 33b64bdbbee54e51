use crate::data::types::TokenSummary;

/// Volume-per-holder weight of the king score
pub const VOLUME_DIVISOR: f64 = 75.0;

/// King score: `floor(sol_reserve / holders − holders * volume / 75)`.
///
/// Lower is better on the podium: a high reserve per holder with little
/// volume churn scores low.
///
/// Zero holders is degenerate and left unguarded. The division yields
/// `+inf`/`-inf` (or NaN when the reserve is also 0) and the token sorts to
/// one end of the podium order; callers that care filter such tokens first.
pub fn king_score(token: &TokenSummary) -> f64 {
    let holders = token.holders_count as f64;
    (token.sol_reserve / holders - holders * token.volume / VOLUME_DIVISOR).floor()
}
