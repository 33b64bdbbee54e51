use std::cmp::Ordering;

use super::scorer::king_score;
use crate::data::types::TokenSummary;

/// Ascending order on scores; NaN scores sort after every number
fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

/// Copy of `tokens` ordered by ascending king score, ties in input order
pub fn rank_by_score(tokens: &[TokenSummary]) -> Vec<(TokenSummary, f64)> {
    let mut scored: Vec<(TokenSummary, f64)> = tokens
        .iter()
        .map(|token| (token.clone(), king_score(token)))
        .collect();
    scored.sort_by(|a, b| compare_scores(a.1, b.1));
    scored
}

/// Copy of `tokens` ordered by descending SOL reserve, for the scrollable list.
///
/// This ordering is unrelated to the podium.
pub fn rank_by_reserve(tokens: &[TokenSummary]) -> Vec<TokenSummary> {
    let mut ranked = tokens.to_vec();
    ranked.sort_by(|a, b| {
        b.sol_reserve
            .partial_cmp(&a.sol_reserve)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// A podium place
#[derive(Debug, Clone, PartialEq)]
pub struct PodiumSlot {
    /// 1, 2 or 3
    pub position: u8,
    pub token: Option<TokenSummary>,
    pub score: Option<f64>,
}

/// The three lowest-scoring tokens
#[derive(Debug, Clone, PartialEq)]
pub struct Podium {
    pub first: PodiumSlot,
    pub second: PodiumSlot,
    pub third: PodiumSlot,
}

impl Podium {
    /// Picks the kings; places stay empty when fewer than three tokens exist
    pub fn select(tokens: &[TokenSummary]) -> Self {
        let mut ranked = rank_by_score(tokens).into_iter();
        let mut slot = |position: u8| {
            let entry = ranked.next();
            PodiumSlot {
                position,
                score: entry.as_ref().map(|(_, score)| *score),
                token: entry.map(|(token, _)| token),
            }
        };

        let first = slot(1);
        let second = slot(2);
        let third = slot(3);
        Self {
            first,
            second,
            third,
        }
    }

    /// Left-to-right display order: 2nd, 1st, 3rd
    pub fn display_order(&self) -> [&PodiumSlot; 3] {
        [&self.second, &self.first, &self.third]
    }

    pub fn is_empty(&self) -> bool {
        self.first.token.is_none()
    }
}
