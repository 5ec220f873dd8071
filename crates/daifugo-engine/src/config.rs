//! Runtime search configuration.

use serde::{Deserialize, Serialize};

use daifugo_core::model::N_PLAYERS;

/// How playout moves are drawn from policy scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectorKind {
    /// Plain softmax over scores.
    Softmax,
    /// Softmax with small probabilities zeroed out before renormalizing.
    ThresholdSoftmax,
    /// Exponentially sharpened softmax favoring the top score.
    ExpBiased,
}

/// All knobs of the decision engine. Every feature switch lives here so a
/// single binary can run any configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub threads: usize,
    /// Worlds kept per decision across all threads.
    pub world_pool: usize,
    /// Hard ceilings on simulation counts.
    pub max_play_simulations: u32,
    pub max_change_simulations: u32,
    /// Per-candidate scaling of the ceiling, see [`SearchConfig::play_simulation_cap`].
    pub simulations_per_candidate: f64,

    pub use_mate_search: bool,
    pub use_two_player_judge: bool,
    pub use_pruning: bool,
    pub use_stopping: bool,

    /// Total observations before pruning may start.
    pub prune_after: u32,
    /// Pruning never drops the candidate count below this.
    pub prune_min_active: usize,
    /// Per-arm observations required before that arm can be pruned.
    pub prune_min_sims: u32,
    /// Arms whose mean reward falls below this fraction of the best are cut.
    pub prune_mean_floor: f64,

    /// Joint posterior draws per stopping check.
    pub stop_draws: usize,
    /// Higher levels tolerate longer deliberation before stopping.
    pub thinking_level: u32,

    pub selector: SelectorKind,
    pub playout_temperature: f64,
    pub selector_threshold: f64,
    /// Depth bound of the perfect-information mate search.
    pub mate_depth: u32,

    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: 4,
            world_pool: 128,
            max_play_simulations: 5000,
            max_change_simulations: 10000,
            simulations_per_candidate: 700.0,
            use_mate_search: true,
            use_two_player_judge: true,
            use_pruning: true,
            use_stopping: true,
            prune_after: 100,
            prune_min_active: 5,
            prune_min_sims: 50,
            prune_mean_floor: 0.05,
            stop_draws: 1600,
            thinking_level: 10,
            selector: SelectorKind::ThresholdSoftmax,
            playout_temperature: 1.0,
            selector_threshold: 0.02,
            mate_depth: 7,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Ceiling on playout count for a play decision with `candidates` legal
    /// moves. Sub-linear in the branching factor so wide roots do not blow
    /// the time budget.
    pub fn play_simulation_cap(&self, candidates: usize) -> u32 {
        let scaled = (candidates as f64).powf(0.8) * self.simulations_per_candidate;
        (scaled as u32).min(self.max_play_simulations)
    }

    pub fn change_simulation_cap(&self, candidates: usize) -> u32 {
        let scaled = (candidates as f64).powf(0.8) * self.simulations_per_candidate;
        (scaled as u32).min(self.max_change_simulations)
    }

    /// Value of one second of deliberation, in units of expected reward.
    /// Doubling the thinking level quarters the implied cost of time, so
    /// higher levels search longer before the stopping rule fires.
    pub fn value_per_second(&self) -> f64 {
        let level = self.thinking_level.max(1) as f64;
        let value_per_clock = 5.0 / (level * level) / 1e10;
        value_per_clock * 3.191e9
    }

    /// Worker iterations between stopping checks on the checking thread.
    pub fn stop_check_interval(&self) -> u32 {
        (32 / self.threads.max(1) as u32).max(4)
    }
}

/// Reward per finishing class, best class first. The bandit works on
/// rewards rescaled into `[0, 1]` by [`RewardTable::gap`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RewardTable {
    pub by_class: [f64; N_PLAYERS],
}

impl Default for RewardTable {
    fn default() -> Self {
        RewardTable {
            by_class: [1.0, 0.7, 0.45, 0.2, 0.0],
        }
    }
}

impl RewardTable {
    pub fn reward(&self, class: u8) -> f64 {
        self.by_class[(class as usize).min(N_PLAYERS - 1)]
    }

    pub fn gap(&self) -> f64 {
        self.by_class[0] - self.by_class[N_PLAYERS - 1]
    }

    /// Reward mapped to `[0, 1]` for the Beta posterior.
    pub fn normalized(&self, class: u8) -> f64 {
        let lo = self.by_class[N_PLAYERS - 1];
        (self.reward(class) - lo) / self.gap()
    }
}
