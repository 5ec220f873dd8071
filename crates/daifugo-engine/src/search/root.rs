//! Shared per-decision search state.
//!
//! One [`RootInfo`] lives for the duration of a decision and is shared by
//! every worker thread. Counters are relaxed atomics; per-arm reward sums
//! sit behind their own mutex so threads contend only when updating the
//! same arm. Selection may read slightly stale statistics, which is
//! acceptable for Thompson sampling.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use daifugo_core::model::cardset::CardSet;
use daifugo_core::model::combo::Combo;

/// What committing to an arm means at the table.
#[derive(Debug, Clone, Copy)]
pub enum RootAction {
    Play(Combo),
    Change { cards: CardSet, to: usize },
}

#[derive(Debug, Clone, Copy, Default)]
struct ArmStats {
    n: f64,
    sum: f64,
}

pub struct RootArm {
    pub action: RootAction,
    stats: Mutex<ArmStats>,
    observations: AtomicU32,
    active: AtomicBool,
}

impl RootArm {
    fn new(action: RootAction, prior_mean: f64, prior_weight: f64) -> RootArm {
        RootArm {
            action,
            stats: Mutex::new(ArmStats {
                n: prior_weight,
                sum: prior_weight * prior_mean,
            }),
            observations: AtomicU32::new(0),
            active: AtomicBool::new(true),
        }
    }

    /// Adds one normalized reward observation.
    pub fn record(&self, reward: f64) {
        let mut stats = self.stats.lock();
        stats.n += 1.0;
        stats.sum += reward;
        drop(stats);
        self.observations.fetch_add(1, Ordering::Relaxed);
    }

    /// Real observations, excluding the policy prior.
    pub fn observations(&self) -> u32 {
        self.observations.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let stats = self.stats.lock();
        stats.sum / stats.n.max(1e-9)
    }

    /// Beta posterior over the normalized reward.
    pub fn posterior(&self) -> (f64, f64) {
        let stats = self.stats.lock();
        let alpha = 1.0 + stats.sum;
        let beta = 1.0 + (stats.n - stats.sum);
        (alpha, beta.max(1e-9))
    }

    pub fn posterior_moments(&self) -> (f64, f64) {
        let (a, b) = self.posterior();
        let mean = a / (a + b);
        let var = a * b / ((a + b) * (a + b) * (a + b + 1.0));
        (mean, var)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Relaxed);
    }
}

pub struct RootInfo {
    pub arms: Vec<RootArm>,
    total: AtomicU32,
    exit: AtomicBool,
    pub started: Instant,
}

impl RootInfo {
    /// `priors` are prior mean rewards per arm, weighted as
    /// `prior_weight` pseudo-observations each.
    pub fn new(actions: Vec<RootAction>, priors: &[f64], prior_weight: f64) -> RootInfo {
        debug_assert_eq!(actions.len(), priors.len());
        let arms = actions
            .into_iter()
            .zip(priors)
            .map(|(action, prior)| RootArm::new(action, *prior, prior_weight))
            .collect();
        RootInfo {
            arms,
            total: AtomicU32::new(0),
            exit: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    pub fn record(&self, arm: usize, reward: f64) {
        self.arms[arm].record(reward);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_observations(&self) -> u32 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn active_count(&self) -> usize {
        self.arms.iter().filter(|a| a.is_active()).count()
    }

    /// Best arm by posterior mean; inactive arms only win when nothing
    /// active exists.
    pub fn best_index(&self) -> usize {
        let mut best = 0;
        let mut best_key = (false, f64::NEG_INFINITY);
        for (i, arm) in self.arms.iter().enumerate() {
            let key = (arm.is_active(), arm.mean());
            if key > best_key {
                best_key = key;
                best = i;
            }
        }
        best
    }

    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::Relaxed);
    }

    pub fn should_exit(&self) -> bool {
        self.exit.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::{RootAction, RootInfo};
    use daifugo_core::model::card::{CardId, Rank, Suit};
    use daifugo_core::model::combo::Combo;

    fn three_arms() -> RootInfo {
        let actions = vec![
            RootAction::Play(Combo::single(CardId::of(Rank::FOUR, Suit::Clubs))),
            RootAction::Play(Combo::single(CardId::of(Rank::FIVE, Suit::Clubs))),
            RootAction::Play(Combo::single(CardId::of(Rank::SIX, Suit::Clubs))),
        ];
        RootInfo::new(actions, &[0.5, 0.5, 0.5], 2.0)
    }

    #[test]
    fn observations_move_the_posterior() {
        let root = three_arms();
        let (a0, b0) = root.arms[0].posterior();
        for _ in 0..10 {
            root.record(0, 1.0);
        }
        let (a1, b1) = root.arms[0].posterior();
        assert!(a1 > a0);
        assert!((b1 - b0).abs() < 1e-9);
        assert_eq!(root.total_observations(), 10);
        assert_eq!(root.arms[0].observations(), 10);
        assert!(root.arms[0].mean() > 0.9);
    }

    #[test]
    fn best_index_prefers_active_arms() {
        let root = three_arms();
        for _ in 0..5 {
            root.record(2, 1.0);
            root.record(1, 0.8);
        }
        assert_eq!(root.best_index(), 2);
        root.arms[2].deactivate();
        assert_eq!(root.best_index(), 1);
    }

    #[test]
    fn posterior_moments_shrink_with_data() {
        let root = three_arms();
        let (_, var0) = root.arms[0].posterior_moments();
        for _ in 0..50 {
            root.record(0, 0.6);
        }
        let (mean, var1) = root.arms[0].posterior_moments();
        assert!(var1 < var0);
        assert!((mean - 0.6).abs() < 0.1);
    }
}
