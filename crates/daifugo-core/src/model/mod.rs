//! Core game objects.
//!
//! This module is composed of:
//! - `card`: ranks, suits and single-card identifiers.
//! - `cardset`: the 64-bit card set and its run-detection bit tricks.
//! - `tables`: derived per-rank count tables and the non-domination table.
//! - `combo`: playable combinations.
//! - `board`: the standing requirement and its transition rules.
//! - `hand`: the incrementally maintained hand index.
//! - `field`: full table state for playouts.

pub mod board;
pub mod card;
pub mod cardset;
pub mod combo;
pub mod field;
pub mod hand;
pub mod tables;

pub use board::Board;
pub use card::{CardId, Rank, Suit, SuitMask};
pub use cardset::CardSet;
pub use combo::{Combo, Shape};
pub use field::{Field, N_PLAYERS};
pub use hand::HandIndex;
