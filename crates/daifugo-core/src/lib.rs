#![deny(warnings)]
//! Rules, bit-indexed hand tables and world sampling for five-player
//! daifugo.

pub mod model;
pub mod play;
pub mod world;
