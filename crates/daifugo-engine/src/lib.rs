#![deny(warnings)]
//! Monte-Carlo decision engine for five-player daifugo: policy-guided
//! playouts over sampled worlds, a Thompson-sampling root bandit, and
//! perfect-information endgame shortcuts.

pub mod config;
pub mod engine;
pub mod oracle;
pub mod policy;
pub mod search;
pub mod sim;

pub use config::{RewardTable, SearchConfig, SelectorKind};
pub use engine::Engine;
pub use oracle::{EndgameOracle, MateOracle, NoEndgame, Verdict};
pub use policy::{HeuristicPolicy, PolicyOracle};
