//! Arm selection and pruning for the root bandit.

use rand::Rng;
use rand::distributions::Distribution;
use statrs::distribution::Beta;

use crate::config::SearchConfig;
use crate::search::root::RootInfo;

/// Thompson sampling over the active arms. Two-candidate decisions just
/// alternate, splitting the budget evenly.
pub fn select_arm<R: Rng + ?Sized>(root: &RootInfo, rng: &mut R) -> usize {
    let active: Vec<usize> = (0..root.arms.len())
        .filter(|i| root.arms[*i].is_active())
        .collect();
    match active.len() {
        0 => return root.best_index(),
        1 => return active[0],
        2 if root.arms.len() == 2 => {
            return active[(root.total_observations() % 2) as usize];
        }
        _ => {}
    }

    let mut best = active[0];
    let mut best_sample = f64::NEG_INFINITY;
    for i in active {
        let (alpha, beta) = root.arms[i].posterior();
        let sample = match Beta::new(alpha, beta) {
            Ok(dist) => dist.sample(rng),
            Err(_) => alpha / (alpha + beta),
        };
        if sample > best_sample {
            best_sample = sample;
            best = i;
        }
    }
    best
}

/// Deactivates arms that are clearly lost, keeping the budget on the
/// contenders. The current best arm and the last `prune_min_active` arms
/// are never cut, and an arm needs `prune_min_sims` observations of its own
/// before its mean is trusted.
pub fn prune(root: &RootInfo, cfg: &SearchConfig) {
    if root.total_observations() <= cfg.prune_after {
        return;
    }
    let mut active_left = root.active_count();
    if active_left <= cfg.prune_min_active {
        return;
    }
    let best = root.best_index();
    let threshold = cfg.prune_mean_floor * root.arms[best].mean();
    for (i, arm) in root.arms.iter().enumerate() {
        if active_left <= cfg.prune_min_active {
            break;
        }
        if i == best || !arm.is_active() {
            continue;
        }
        if arm.observations() >= cfg.prune_min_sims && arm.mean() < threshold {
            arm.deactivate();
            active_left -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{prune, select_arm};
    use crate::config::SearchConfig;
    use crate::search::root::{RootAction, RootInfo};
    use daifugo_core::model::card::{CardId, Rank, Suit};
    use daifugo_core::model::combo::Combo;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn root_with(n: usize) -> RootInfo {
        let actions: Vec<RootAction> = (0..n)
            .map(|i| {
                RootAction::Play(Combo::single(CardId::of(
                    Rank::new((i + 1) as u8),
                    Suit::Clubs,
                )))
            })
            .collect();
        RootInfo::new(actions, &vec![0.5; n], 2.0)
    }

    #[test]
    fn thompson_concentrates_on_the_winning_arm() {
        let root = root_with(3);
        for _ in 0..60 {
            root.record(0, 1.0);
            root.record(1, 0.2);
            root.record(2, 0.1);
        }
        let mut rng = SmallRng::seed_from_u64(4);
        let mut hits = 0;
        for _ in 0..200 {
            if select_arm(&root, &mut rng) == 0 {
                hits += 1;
            }
        }
        assert!(hits > 150, "winning arm picked only {hits}/200 times");
    }

    #[test]
    fn two_arms_alternate() {
        let root = root_with(2);
        let mut rng = SmallRng::seed_from_u64(1);
        let first = select_arm(&root, &mut rng);
        root.record(first, 1.0);
        let second = select_arm(&root, &mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn pruning_respects_floors_and_keeps_contenders() {
        let cfg = SearchConfig::default();
        let root = root_with(8);
        // arm 0 dominates, arms 6 and 7 are hopeless with enough data
        for _ in 0..60 {
            root.record(0, 1.0);
            root.record(6, 0.0);
            root.record(7, 0.0);
        }
        prune(&root, &cfg);
        assert!(root.arms[0].is_active());
        assert!(!root.arms[6].is_active());
        assert!(!root.arms[7].is_active());
        // untested arms keep their prior and survive
        assert!(root.arms[3].is_active());
        assert!(root.active_count() >= cfg.prune_min_active);
    }

    #[test]
    fn pruning_waits_for_enough_data() {
        let cfg = SearchConfig::default();
        let root = root_with(8);
        for _ in 0..20 {
            root.record(0, 1.0);
            root.record(6, 0.0);
        }
        // only 40 total observations, below the activation gate
        prune(&root, &cfg);
        assert_eq!(root.active_count(), 8);
    }
}
