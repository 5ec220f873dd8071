//! The worker loop run by every search thread.
//!
//! All threads execute the same loop; the only asymmetry is that thread 0
//! doubles as the stopping checker. Worlds are drawn from a shared pool so
//! every arm sees the same determinizations while the pool fills, which
//! keeps early arm comparisons paired.

use parking_lot::Mutex;
use rand::Rng;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::warn;

use daifugo_core::world::record::PublicRecord;
use daifugo_core::world::sampler::{RandomDealer, World};

use crate::config::{RewardTable, SearchConfig};
use crate::oracle::EndgameOracle;
use crate::policy::PolicyOracle;
use crate::search::bandit;
use crate::search::root::{RootAction, RootInfo};
use crate::search::stopping;
use crate::sim::playout::Playout;
use crate::sim::selector::Selector;

/// Consecutive sampling failures before a worker gives up entirely.
const FAILURE_LIMIT: u32 = 64;

/// Everything a worker thread needs, shared by reference across threads.
pub struct SearchContext<'a, O: EndgameOracle, P: PolicyOracle> {
    pub root: &'a RootInfo,
    pub record: &'a PublicRecord,
    pub cfg: &'a SearchConfig,
    pub rewards: RewardTable,
    pub oracle: &'a O,
    pub policy: &'a P,
    pub dealer: &'a RandomDealer,
    pub worlds: &'a Mutex<Vec<World>>,
    pub max_simulations: u32,
}

pub fn run_worker<O: EndgameOracle, P: PolicyOracle>(
    ctx: &SearchContext<'_, O, P>,
    thread_id: usize,
    seed: u64,
) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let playout = Playout {
        oracle: ctx.oracle,
        policy: ctx.policy,
        selector: Selector::from_config(ctx.cfg),
        rewards: ctx.rewards,
        use_mate: ctx.cfg.use_mate_search,
        use_two_player_judge: ctx.cfg.use_two_player_judge,
    };
    let check_interval = ctx.cfg.stop_check_interval();
    let mut iters = 0u32;
    let mut failure_streak = 0u32;

    loop {
        if ctx.root.should_exit() || ctx.root.total_observations() >= ctx.max_simulations {
            break;
        }
        iters += 1;

        let arm = bandit::select_arm(ctx.root, &mut rng);
        let world = match acquire_world(ctx, arm, &mut rng) {
            Some(world) => {
                failure_streak = 0;
                world
            }
            None => {
                failure_streak += 1;
                if failure_streak % 16 == 0 {
                    warn!(thread_id, failure_streak, "world sampling keeps failing");
                }
                if failure_streak >= FAILURE_LIMIT {
                    break;
                }
                continue;
            }
        };

        let mut field = ctx.record.instantiate(world.hands);
        let over = match ctx.root.arms[arm].action {
            RootAction::Play(m) => field.proc(ctx.record.my_seat, &m).is_none(),
            RootAction::Change { cards, to } => {
                field.commit_exchange(ctx.record.my_seat, to, cards);
                false
            }
        };
        let reward = if over {
            let class = field.classes[ctx.record.my_seat].unwrap_or(0);
            ctx.rewards.normalized(class)
        } else {
            playout.run(&mut field, &mut rng)[ctx.record.my_seat]
        };
        ctx.root.record(arm, reward);

        if ctx.cfg.use_pruning {
            bandit::prune(ctx.root, ctx.cfg);
        }
        if thread_id == 0
            && ctx.cfg.use_stopping
            && iters % check_interval == 0
            && ctx.root.total_observations() > 4 * ctx.root.arms.len() as u32
            && stopping::should_stop(ctx.root, ctx.cfg, &ctx.rewards, &mut rng)
        {
            ctx.root.request_exit();
            break;
        }
    }
}

/// Pool policy: replay the pool in order for an arm's first passes, grow
/// the pool until it is full, then reuse random entries.
fn acquire_world<O: EndgameOracle, P: PolicyOracle, R: Rng + ?Sized>(
    ctx: &SearchContext<'_, O, P>,
    arm: usize,
    rng: &mut R,
) -> Option<World> {
    let reuse_index = ctx.root.arms[arm].observations() as usize;
    {
        let pool = ctx.worlds.lock();
        if reuse_index < pool.len() {
            return Some(pool[reuse_index]);
        }
        if pool.len() >= ctx.cfg.world_pool && !pool.is_empty() {
            return Some(pool[rng.gen_range(0..pool.len())]);
        }
    }
    match ctx.dealer.deal(ctx.record, rng) {
        Ok(world) => {
            let mut pool = ctx.worlds.lock();
            if pool.len() < ctx.cfg.world_pool {
                pool.push(world);
            }
            Some(world)
        }
        Err(_) => {
            let pool = ctx.worlds.lock();
            if pool.is_empty() {
                None
            } else {
                Some(pool[rng.gen_range(0..pool.len())])
            }
        }
    }
}
