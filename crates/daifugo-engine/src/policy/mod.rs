//! Move-scoring policies used for playouts and root priors.

mod heuristic;

pub use heuristic::{HeuristicPolicy, PolicyParams};

use daifugo_core::model::board::Board;
use daifugo_core::model::combo::Combo;
use daifugo_core::model::hand::HandIndex;

/// Scores legal moves for the hand on turn. Scores feed a softmax-family
/// selector, so only their differences matter.
pub trait PolicyOracle: Sync {
    fn score_moves(&self, hand: &HandIndex, board: &Board, moves: &[Combo]) -> Vec<f64>;
}
