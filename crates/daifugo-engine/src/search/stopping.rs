//! Regret-based early stopping.
//!
//! Committing to the current best arm forfeits whatever a better arm would
//! still have earned. That expected regret is estimated by joint draws from
//! the arms' posteriors and compared against the value of the time further
//! search would cost: once another batch of simulations is worth more than
//! the reward at stake, the search stops.

use rand::Rng;
use rand::distributions::Distribution;
use statrs::distribution::Normal;

use crate::config::{RewardTable, SearchConfig};
use crate::search::root::RootInfo;

pub fn should_stop<R: Rng + ?Sized>(
    root: &RootInfo,
    cfg: &SearchConfig,
    rewards: &RewardTable,
    rng: &mut R,
) -> bool {
    let active: Vec<usize> = (0..root.arms.len())
        .filter(|i| root.arms[*i].is_active())
        .collect();
    if active.len() <= 1 {
        return true;
    }
    let committed = root.best_index();

    let dists: Vec<(usize, Option<Normal>)> = active
        .iter()
        .map(|&i| {
            let (mean, var) = root.arms[i].posterior_moments();
            (i, Normal::new(mean, var.sqrt().max(1e-9)).ok())
        })
        .collect();

    let mut regret = 0.0;
    for _ in 0..cfg.stop_draws {
        let mut max_sample = f64::NEG_INFINITY;
        let mut committed_sample = 0.0;
        for (i, dist) in &dists {
            let sample = match dist {
                Some(d) => d.sample(rng),
                None => root.arms[*i].mean(),
            };
            if *i == committed {
                committed_sample = sample;
            }
            if sample > max_sample {
                max_sample = sample;
            }
        }
        regret += (max_sample - committed_sample).max(0.0);
    }

    let elapsed = root.started.elapsed().as_secs_f64();
    let threshold =
        cfg.stop_draws as f64 * 2.0 * elapsed * cfg.value_per_second() / rewards.gap();
    regret < threshold
}
