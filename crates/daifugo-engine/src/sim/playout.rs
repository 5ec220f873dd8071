//! Policy-driven playout of a determinized table to completion.

use rand::Rng;
use rand::seq::SliceRandom;

use daifugo_core::model::field::{Field, N_PLAYERS};
use daifugo_core::model::hand::HandIndex;
use daifugo_core::play::moves::generate_legal;

use crate::config::RewardTable;
use crate::oracle::{EndgameOracle, Verdict};
use crate::policy::PolicyOracle;
use crate::sim::selector::Selector;

/// A full deal never takes this many actions; the guard only catches a
/// rules bug that would otherwise loop forever.
const MAX_PLIES: u32 = 600;

pub struct Playout<'a, O: EndgameOracle, P: PolicyOracle> {
    pub oracle: &'a O,
    pub policy: &'a P,
    pub selector: Selector,
    pub rewards: RewardTable,
    pub use_mate: bool,
    pub use_two_player_judge: bool,
}

impl<'a, O: EndgameOracle, P: PolicyOracle> Playout<'a, O, P> {
    /// Runs `field` to the end and returns each seat's normalized reward.
    pub fn run<R: Rng + ?Sized>(&self, field: &mut Field, rng: &mut R) -> [f64; N_PLAYERS] {
        let mut plies = 0u32;
        while !field.is_over() && plies < MAX_PLIES {
            plies += 1;
            let seat = field.turn;

            if self.use_two_player_judge
                && field.n_alive() == 2
                && self.oracle.judge_two_player(field, seat) == Verdict::Win
            {
                settle_two_player(field, seat);
                break;
            }

            let moves = generate_legal(field.hand(seat), &field.board);
            debug_assert!(!moves.is_empty());

            // immediate finishers first, then a forced line if one exists
            let finishers: Vec<_> = moves
                .iter()
                .filter(|m| u32::from(m.qty()) == field.hand(seat).qty && !m.is_pass())
                .copied()
                .collect();
            let chosen = if let Some(&win) = finishers.choose(rng) {
                win
            } else if self.use_mate {
                let ops = HandIndex::new(field.opponents_of(seat));
                match self.oracle.winning_move(field.hand(seat), &field.board, &ops) {
                    Some(win) => win,
                    None => self.policy_move(field, seat, &moves, rng),
                }
            } else {
                self.policy_move(field, seat, &moves, rng)
            };
            if field.proc(seat, &chosen).is_none() {
                break;
            }
        }
        if plies >= MAX_PLIES {
            settle_by_hand_size(field);
        }

        let mut out = [0.0; N_PLAYERS];
        for p in 0..N_PLAYERS {
            let class = field.classes[p].unwrap_or((N_PLAYERS - 1) as u8);
            out[p] = self.rewards.normalized(class);
        }
        out
    }

    fn policy_move<R: Rng + ?Sized>(
        &self,
        field: &Field,
        seat: usize,
        moves: &[daifugo_core::model::combo::Combo],
        rng: &mut R,
    ) -> daifugo_core::model::combo::Combo {
        let scores = self.policy.score_moves(field.hand(seat), &field.board, moves);
        moves[self.selector.pick(&scores, rng)]
    }
}

/// The mover has a proven win with two seats left: they take the better
/// remaining class, the opponent the worse.
fn settle_two_player(field: &mut Field, winner: usize) {
    let done = field.classes.iter().filter(|c| c.is_some()).count() as u8;
    field.classes[winner] = Some(done);
    for p in 0..N_PLAYERS {
        if p != winner && field.classes[p].is_none() {
            field.classes[p] = Some(done + 1);
        }
    }
}

/// Emergency ranking when the ply guard fires: fewer cards ranks better.
fn settle_by_hand_size(field: &mut Field) {
    let mut done = field.classes.iter().filter(|c| c.is_some()).count() as u8;
    let mut open: Vec<usize> = (0..N_PLAYERS)
        .filter(|p| field.classes[*p].is_none())
        .collect();
    open.sort_by_key(|p| (field.hand(*p).qty, *p));
    for p in open {
        field.classes[p] = Some(done);
        done += 1;
    }
}
