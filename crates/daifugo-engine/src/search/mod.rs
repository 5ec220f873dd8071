//! Root-parallel Thompson-sampling search.

pub mod bandit;
pub mod root;
pub mod stopping;
pub mod worker;

pub use root::{RootAction, RootArm, RootInfo};
pub use worker::SearchContext;

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use daifugo_core::world::record::PublicRecord;
use daifugo_core::world::sampler::RandomDealer;

use crate::config::{RewardTable, SearchConfig};
use crate::oracle::EndgameOracle;
use crate::policy::PolicyOracle;

/// Pseudo-observation weight of the policy prior on each arm.
pub const PRIOR_WEIGHT: f64 = 2.0;

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15)
}

/// Runs the full multi-threaded search and returns the root statistics.
#[allow(clippy::too_many_arguments)]
pub fn run_search<O: EndgameOracle, P: PolicyOracle>(
    record: &PublicRecord,
    actions: Vec<RootAction>,
    priors: &[f64],
    cfg: &SearchConfig,
    rewards: RewardTable,
    oracle: &O,
    policy: &P,
    max_simulations: u32,
) -> RootInfo {
    let root = RootInfo::new(actions, priors, PRIOR_WEIGHT);
    let dealer = RandomDealer::new();
    let worlds = Mutex::new(Vec::new());
    let ctx = SearchContext {
        root: &root,
        record,
        cfg,
        rewards,
        oracle,
        policy,
        dealer: &dealer,
        worlds: &worlds,
        max_simulations,
    };
    let base_seed = cfg.seed.unwrap_or_else(seed_from_clock);
    let threads = cfg.threads.max(1);
    std::thread::scope(|scope| {
        for thread_id in 0..threads {
            let ctx = &ctx;
            let seed = base_seed ^ (thread_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            scope.spawn(move || worker::run_worker(ctx, thread_id, seed));
        }
    });
    root
}

#[cfg(test)]
mod tests {
    use super::{RootAction, run_search};
    use crate::config::{RewardTable, SearchConfig};
    use crate::oracle::MateOracle;
    use crate::policy::HeuristicPolicy;
    use daifugo_core::model::card::CardId;
    use daifugo_core::model::cardset::CardSet;
    use daifugo_core::model::combo::Combo;
    use daifugo_core::world::record::PublicRecord;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn search_observes_every_arm() {
        let mut deck: Vec<CardId> = CardSet::ALL.iter().collect();
        let mut rng = SmallRng::seed_from_u64(13);
        deck.shuffle(&mut rng);
        let mut mine = CardSet::EMPTY;
        for &card in deck.iter().take(11) {
            mine.insert(card);
        }
        let record = PublicRecord::opening(0, mine, [11, 11, 11, 10, 10]);

        let two = mine.iter().take(2).collect::<Vec<_>>();
        let actions = vec![
            RootAction::Play(Combo::single(two[0])),
            RootAction::Play(Combo::single(two[1])),
        ];
        let cfg = SearchConfig {
            threads: 2,
            use_stopping: false,
            seed: Some(99),
            ..SearchConfig::default()
        };
        let root = run_search(
            &record,
            actions,
            &[0.5, 0.5],
            &cfg,
            RewardTable::default(),
            &MateOracle::new(3),
            &HeuristicPolicy::default(),
            120,
        );
        assert!(root.total_observations() >= 120);
        assert!(root.arms[0].observations() > 0);
        assert!(root.arms[1].observations() > 0);
    }
}
