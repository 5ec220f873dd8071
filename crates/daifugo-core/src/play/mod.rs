//! Move generation and domination analysis.

pub mod dominance;
pub mod moves;

pub use dominance::{board_dominates, dominates};
pub use moves::generate_legal;
