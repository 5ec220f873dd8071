//! Legal combination generation.
//!
//! Generation is not the hot loop (domination tests are), so the joker
//! enumeration here favors clarity over bit-maximal tricks; the per-rank
//! counts come straight from the hand index.

use crate::model::board::Board;
use crate::model::card::{CardId, Rank, Suit, SuitMask};
use crate::model::cardset::{CardSet, group_valid_zone, polym_ranks, seq_valid_zone};
use crate::model::combo::{Combo, Shape};
use crate::model::hand::HandIndex;

/// Every legal reply to `board`, pass included on a non-null board. A lead
/// (null board) must pick a combination, so no pass is offered there.
pub fn generate_legal(hand: &HandIndex, board: &Board) -> Vec<Combo> {
    let mut out = Vec::new();
    if board.is_invalid() {
        out.push(Combo::PASS);
        return out;
    }
    if board.is_null() {
        gen_lead(hand, &mut out);
    } else {
        out.push(Combo::PASS);
        gen_follow(hand, board, &mut out);
    }
    out
}

fn gen_lead(hand: &HandIndex, out: &mut Vec<Combo>) {
    for card in hand.cards.plain().iter() {
        out.push(Combo::single(card));
    }
    if hand.jokers > 0 {
        out.push(Combo::joker_single());
    }
    for r in 1..=13u8 {
        gen_groups_at(hand, Rank::new(r), None, None, out);
    }
    for qty in 3..=5u8 {
        gen_seqs(hand, qty, CardSet::ALL, None, out);
    }
}

fn gen_follow(hand: &HandIndex, board: &Board, out: &mut Vec<Combo>) {
    if board.is_single_joker() {
        if hand.cards.contains(CardId::SPADE3) {
            out.push(Combo::single(CardId::SPADE3));
        }
        return;
    }
    let lock = if board.suits_locked() {
        Some(board.suits())
    } else {
        None
    };
    match board.shape() {
        Shape::Single => {
            let zone = group_valid_zone(board.order_reversed(), board.rank());
            let candidates = hand.cards.plain()
                & zone
                & lock.map_or(CardSet::ALL, CardSet::suit_cards);
            for card in candidates.iter() {
                out.push(Combo::single(card));
            }
            if hand.jokers > 0 {
                out.push(Combo::joker_single());
            }
        }
        Shape::Group => {
            let zone = group_valid_zone(board.order_reversed(), board.rank());
            for r in 1..=13u8 {
                if !zone.intersects(CardSet::rank_cards(Rank::new(r))) {
                    continue;
                }
                gen_groups_at(hand, Rank::new(r), Some(board.qty()), lock, out);
            }
        }
        Shape::Sequence => {
            let zone = seq_valid_zone(board.order_reversed(), board.rank(), board.qty());
            gen_seqs(hand, board.qty(), zone, lock, out);
        }
        Shape::Pass => unreachable!("null boards are handled by the caller"),
    }
}

/// All groups at one rank. `want` fixes the quantity (board reply); `lock`
/// fixes the exact suit set.
fn gen_groups_at(
    hand: &HandIndex,
    rank: Rank,
    want: Option<u8>,
    lock: Option<SuitMask>,
    out: &mut Vec<Combo>,
) {
    let have = SuitMask::new(((hand.cards.bits() >> (rank.value() * 4)) & 0xF) as u8);
    let count = have.count() as u8;
    let joker = hand.jokers > 0;

    if let Some(suits) = lock {
        if want == Some(5) {
            // only another quintuple answers a locked quintuple
            if count == 4 && joker {
                out.push(Combo::quintuple(rank));
            }
            return;
        }
        let q = suits.count() as u8;
        if want.is_some_and(|w| w != q) {
            return;
        }
        let missing = SuitMask::new(suits.bits() & !have.bits());
        match missing.count() {
            0 if q >= 2 => out.push(Combo::group(rank, suits)),
            1 if joker && q >= 2 => {
                if let Some(s) = missing.lowest() {
                    out.push(Combo::group_with_joker(rank, suits, s));
                }
            }
            _ => {}
        }
        return;
    }

    let quantities: Vec<u8> = match want {
        Some(w) => vec![w],
        None => (2..=5).collect(),
    };
    for q in quantities {
        if q == 5 {
            if count == 4 && joker {
                out.push(Combo::quintuple(rank));
            }
            continue;
        }
        for bits in subsets_of_size(have, q) {
            out.push(Combo::group(rank, bits));
        }
        if joker && q >= 2 && count >= q - 1 {
            for bits in subsets_of_size(have, q - 1) {
                for s in SuitMask::new(!bits.bits() & 0xF).iter() {
                    out.push(Combo::group_with_joker(rank, bits.with(s), s));
                }
            }
        }
    }
}

fn subsets_of_size(mask: SuitMask, size: u8) -> Vec<SuitMask> {
    let mut result = Vec::new();
    for bits in 0..16u8 {
        let s = SuitMask::new(bits & mask.bits());
        if s.bits() == bits && s.count() as u8 == size {
            result.push(s);
        }
    }
    result
}

/// Runs of length `qty` whose start rank lies in `zone`, optionally locked
/// to one suit.
fn gen_seqs(
    hand: &HandIndex,
    qty: u8,
    zone: CardSet,
    lock: Option<SuitMask>,
    out: &mut Vec<Combo>,
) {
    let plain = hand.cards.plain();
    let suit_filter = lock.map_or(CardSet::ALL, CardSet::suit_cards);

    let starts = polym_ranks(plain, qty) & zone & suit_filter;
    for start in starts.iter() {
        out.push(Combo::sequence(start.rank(), start.suit(), qty));
    }

    if hand.jokers == 0 {
        return;
    }
    for suit in Suit::ALL {
        if lock.is_some_and(|l| !l.contains(suit)) {
            continue;
        }
        for r in 1..=(14 - qty) {
            let start = Rank::new(r);
            if !zone.contains(CardId::of(start, suit)) {
                continue;
            }
            let mut missing = None;
            let mut missing_count = 0;
            for i in 0..qty {
                let rank = Rank::new(r + i);
                if !plain.contains(CardId::of(rank, suit)) {
                    missing = Some(rank);
                    missing_count += 1;
                }
            }
            if missing_count == 1 {
                if let Some(jr) = missing {
                    out.push(Combo::sequence_with_joker(start, suit, qty, jr));
                }
            }
        }
    }
}
