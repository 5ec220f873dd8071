//! Domination tests: does a combination leave the opponent pool without a
//! legal reply?
//!
//! Groups and singles resolve in O(1) against the hand index's
//! non-domination tables; runs intersect the run-possibility masks with the
//! legal zone. The reversed-order run zone is deliberately one rank loose,
//! so a `false` may occasionally mean "probably answerable": callers treat
//! domination as a sufficient condition, never a necessary one.

use crate::model::board::Board;
use crate::model::card::{CardId, Rank};
use crate::model::cardset::{CardSet, can_make_seq, group_valid_zone};
use crate::model::combo::{Combo, Shape};
use crate::model::hand::HandIndex;
use crate::model::tables::{cards_to_fr, PQR_1};

/// True when no reply to `m` on `board` exists anywhere in `ops`.
pub fn dominates(m: &Combo, board: &Board, ops: &HandIndex) -> bool {
    if m.is_pass() {
        return false;
    }
    if m.dominates_inevitably() {
        return true;
    }
    let mut after = *board;
    after.apply(m);
    if after.is_null() {
        return true;
    }
    board_dominates(&after, ops)
}

/// True when the standing board requirement has no reply in `ops`.
pub fn board_dominates(board: &Board, ops: &HandIndex) -> bool {
    if board.is_null() {
        return false;
    }
    if board.is_single_joker() {
        return !ops.cards.contains(CardId::SPADE3);
    }
    match board.shape() {
        Shape::Sequence => seq_dominated(board, ops),
        _ => group_dominated(board, ops),
    }
}

fn group_dominated(board: &Board, ops: &HandIndex) -> bool {
    let reversed = board.order_reversed();
    let q = board.qty();
    if q >= 5 {
        // only another quintuple answers
        if ops.jokers == 0 {
            return true;
        }
        let zone = group_valid_zone(reversed, board.rank()).bits();
        return cards_to_fr(ops.cards.plain().bits()) & zone & PQR_1 == 0;
    }
    if board.suits_locked() {
        return locked_group_dominated(board, ops);
    }
    let cell = (1u64 << (q - 1)) << (board.rank().value() * 4);
    ops.nd(reversed) & cell == 0
}

/// A locked requirement needs the exact suit set at a stronger rank; scan
/// the zone rank by rank (locks are rare, the zone is at most 12 ranks).
fn locked_group_dominated(board: &Board, ops: &HandIndex) -> bool {
    if board.qty() == 1 && ops.jokers > 0 {
        // the joker single ignores the lock
        return false;
    }
    let suits = board.suits().bits();
    let zone = group_valid_zone(board.order_reversed(), board.rank());
    for r in 1..=13u8 {
        if !zone.intersects(CardSet::rank_cards(Rank::new(r))) {
            continue;
        }
        let have = ((ops.cards.bits() >> (r * 4)) & 0xF) as u8;
        let missing = (suits & !have).count_ones();
        if missing == 0 || (missing == 1 && ops.jokers > 0) {
            return false;
        }
    }
    true
}

fn seq_dominated(board: &Board, ops: &HandIndex) -> bool {
    let q = board.qty();
    let reversed = board.order_reversed();
    // Normal order is exact; reversed keeps the looser classic zone because
    // a joker-led run can start one rank below its possibility flag.
    let zone = if reversed {
        CardSet::rank_range(Rank::MIN.value(), board.rank().value().wrapping_sub(1))
    } else {
        CardSet::rank_range(board.rank().value() + q, Rank::MAX.value())
    };
    let zone = if board.suits_locked() {
        zone & CardSet::suit_cards(board.suits())
    } else {
        zone
    };
    (can_make_seq(ops.cards.plain(), ops.jokers, q) & zone).is_empty()
}
