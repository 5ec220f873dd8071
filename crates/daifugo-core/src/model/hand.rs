//! Redundantly-indexed hand representation.
//!
//! Every derived field is a pure function of `cards`; `reduce`/`restore`
//! maintain them incrementally, touching only the ranks a combination
//! covers, and `verify` checks the whole index against a from-scratch
//! rebuild.

use serde::{Deserialize, Serialize};

use crate::model::card::Suit;
use crate::model::cardset::{CardSet, run_starts};
use crate::model::combo::Combo;
use crate::model::tables::{
    ND_TABLE, PQR_1, PQR_4, PQR_123, PQR_234, cards_to_qr, pqr_to_nd, pqr_to_sc, qr_to_pqr,
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HandIndex {
    pub cards: CardSet,
    pub qty: u32,
    pub jokers: u32,
    /// Start positions of plain-or-joker 3-runs.
    pub seq: CardSet,
    /// Per-rank counts, one nibble each.
    pub qr: u64,
    /// One-hot count positions per rank.
    pub pqr: u64,
    /// Low-bits-filled counts per rank.
    pub sc: u64,
    /// Non-domination zones, `[normal, reversed]`.
    pub nd: [u64; 2],
}

impl HandIndex {
    pub fn new(cards: CardSet) -> HandIndex {
        let mut hand = HandIndex::default();
        hand.rebuild(cards);
        hand
    }

    /// From-scratch construction of every derived table.
    pub fn rebuild(&mut self, cards: CardSet) {
        self.cards = cards;
        self.qty = cards.count();
        self.jokers = cards.jokers();
        let plain = cards.plain().bits();
        self.qr = cards_to_qr(plain);
        self.pqr = qr_to_pqr(self.qr);
        self.sc = pqr_to_sc(self.pqr);
        self.seq = run_starts(cards.plain(), self.jokers, 3);
        self.nd = pqr_to_nd(self.pqr, self.jokers);
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn nd(&self, reversed: bool) -> u64 {
        self.nd[reversed as usize]
    }

    /// Re-index after a bulk card change (deal or exchange).
    pub fn add_cards(&mut self, dc: CardSet) {
        self.rebuild(self.cards | dc);
    }

    pub fn remove_cards(&mut self, dc: CardSet) {
        debug_assert!(self.cards.contains_all(dc));
        self.rebuild(self.cards & !dc);
    }

    /// Remove a played combination, updating every table in time
    /// proportional to the ranks touched.
    pub fn reduce(&mut self, m: &Combo) {
        debug_assert!(!m.is_pass());
        let dc = m.cards();
        debug_assert!(self.cards.contains_all(dc));
        let dq = m.qty() as u32;
        let djk = dc.jokers();
        let r = m.rank().value();

        self.cards ^= dc;
        self.qty -= dq;
        self.jokers -= djk;
        let plain = self.cards.plain();
        self.seq = run_starts(plain, self.jokers, 3);

        if djk != 0 {
            // Losing the joker shifts both zones down one quantity step;
            // an intact four-of-a-kind keeps its column.
            self.nd[0] = (self.nd[0] & PQR_234) >> 1;
            self.nd[1] = (self.nd[1] & PQR_234) >> 1;
            let quad = self.pqr & PQR_4;
            if quad != 0 {
                let hi = (63 - quad.leading_zeros()) >> 2;
                self.nd[0] |= ND_TABLE[0][hi as usize - 1][3];
                let lo = quad.trailing_zeros() >> 2;
                self.nd[1] |= ND_TABLE[1][lo as usize + 1][3];
            }
        }

        if dc.plain().is_empty() {
            // Only the joker left the hand.
            return;
        }

        if !m.is_seq() {
            let dq = dq - djk;
            let mask = CardSet::rank_cards(m.rank()).bits();
            let opqr = self.pqr & mask;

            self.qr -= (dq as u64) << (r * 4);
            self.pqr = (((self.pqr & mask) >> dq) & mask) | (self.pqr & !mask);
            let orgsc = self.sc;
            self.sc = (((self.sc & mask) >> dq) & mask) | (self.sc & !mask);

            if self.jokers != 0 {
                // Back to the plain encoding before patching the zones.
                self.nd[0] = (self.nd[0] & PQR_234) >> 1;
                self.nd[1] = (self.nd[1] & PQR_234) >> 1;
            }
            let dmask = orgsc ^ self.sc;

            if opqr & self.nd[0] == 0 {
                let mut d = dmask & !self.nd[0];
                loop {
                    d >>= 4;
                    self.nd[0] ^= d;
                    d &= !self.sc;
                    if d & CardSet::ALL.bits() == 0 {
                        break;
                    }
                }
            }
            if opqr & self.nd[1] == 0 {
                let mut d = dmask & !self.nd[1];
                loop {
                    d <<= 4;
                    self.nd[1] ^= d;
                    d &= !self.sc;
                    if d & CardSet::ALL.bits() == 0 {
                        break;
                    }
                }
            }
            if self.jokers != 0 {
                self.nd[0] = (self.nd[0] << 1) | PQR_1;
                self.nd[1] = ((self.nd[1] << 1) & PQR_234) | PQR_1;
            }
        } else {
            let mut mask = CardSet::rank_range(r, r + m.qty() - 1).bits();
            let mut dqr = dc.bits();
            if let Some(jr) = m.joker_rank() {
                let jkmask = CardSet::rank_cards(jr).bits();
                mask &= !jkmask;
                dqr = dc.plain().bits();
            }
            let sn = m
                .suits()
                .lowest()
                .map(Suit::index)
                .unwrap_or(0) as u32;
            dqr >>= sn;

            self.qr -= dqr;
            self.pqr = ((self.pqr & mask & PQR_234) >> 1) | (self.pqr & !mask);
            self.sc = ((self.sc & mask & PQR_234) >> 1) | (self.sc & !mask);
            // Runs touch up to five ranks; recomputing the zones is cheaper
            // than delta-tracking them.
            self.nd = pqr_to_nd(self.pqr, self.jokers);
        }
    }

    /// Exact inverse of `reduce`, re-inserting a previously removed
    /// combination.
    pub fn restore(&mut self, m: &Combo) {
        debug_assert!(!m.is_pass());
        let dc = m.cards();
        debug_assert!(!self.cards.intersects(dc));
        let dq = m.qty() as u32;
        let djk = dc.jokers();
        let r = m.rank().value();

        self.cards |= dc;
        self.qty += dq;
        self.jokers += djk;
        let plain = self.cards.plain();
        self.seq = run_starts(plain, self.jokers, 3);

        if djk != 0 {
            self.nd[0] = ((self.nd[0] & PQR_123) << 1) | PQR_1;
            self.nd[1] = ((self.nd[1] & PQR_123) << 1) | PQR_1;
        }

        if dc.plain().is_empty() {
            return;
        }

        if !m.is_seq() {
            let dq = dq - djk;
            let mask = CardSet::rank_cards(m.rank()).bits();

            self.qr += (dq as u64) << (r * 4);
            let nq = (self.qr >> (r * 4)) & 0xF;

            self.pqr = ((1u64 << (nq - 1)) << (r * 4)) | (self.pqr & !mask);
            self.sc |= ((1u64 << nq) - 1) << (r * 4);

            let mut npqr = self.pqr & mask;
            let mut nq = nq as usize;
            if self.jokers != 0 {
                if npqr & PQR_4 != 0 {
                    npqr = (npqr & PQR_4) | ((npqr & PQR_123) << 1);
                } else {
                    npqr <<= 1;
                }
                nq += self.jokers as usize;
            }
            if npqr & self.nd[0] == 0 {
                self.nd[0] |= ND_TABLE[0][r as usize - 1][nq - 1];
            }
            if npqr & self.nd[1] == 0 {
                self.nd[1] |= ND_TABLE[1][r as usize + 1][nq - 1];
            }
        } else {
            let mut mask = CardSet::rank_range(r, r + m.qty() - 1).bits();
            let mut dqr = dc.bits();
            if let Some(jr) = m.joker_rank() {
                let jkmask = CardSet::rank_cards(jr).bits();
                mask ^= jkmask & mask;
                dqr &= !jkmask & !CardSet::JOKER.bits();
            }
            let sn = m
                .suits()
                .lowest()
                .map(Suit::index)
                .unwrap_or(0) as u32;
            dqr >>= sn;

            self.qr += dqr;
            // Uses the pre-update sc to find the ranks that were empty.
            self.pqr = ((self.pqr & mask) << 1) | (!self.sc & mask & PQR_1) | (self.pqr & !mask);
            self.sc |= ((self.sc & mask) << 1) | (mask & PQR_1);
            self.nd = pqr_to_nd(self.pqr, self.jokers);
        }
    }

    /// Check every derived table against a from-scratch rebuild.
    pub fn verify(&self) -> bool {
        let fresh = HandIndex::new(self.cards);
        self.qty == fresh.qty
            && self.jokers == fresh.jokers
            && self.seq == fresh.seq
            && self.qr == fresh.qr
            && self.pqr == fresh.pqr
            && self.sc == fresh.sc
            && self.nd == fresh.nd
    }
}

#[cfg(test)]
mod tests {
    use super::HandIndex;
    use crate::model::card::{CardId, Rank, Suit, SuitMask};
    use crate::model::cardset::CardSet;
    use crate::model::combo::Combo;
    use crate::play::moves::generate_legal;
    use crate::model::board::Board;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_hand(rng: &mut SmallRng, n: u32, with_joker: bool) -> CardSet {
        let mut set = CardSet::EMPTY;
        if with_joker {
            set.insert(CardId::JOKER);
        }
        while set.count() < n {
            let r = rng.gen_range(1..=13u8);
            let s = rng.gen_range(0..4u8);
            set.insert(CardId::of(Rank::new(r), Suit::from_index(s)));
        }
        set
    }

    #[test]
    fn rebuild_is_consistent() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..200 {
            let with_joker = rng.gen_bool(0.5);
            let hand = HandIndex::new(random_hand(&mut rng, 14, with_joker));
            assert!(hand.verify());
        }
    }

    #[test]
    fn reduce_matches_rebuild_over_random_play_sequences() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let null = Board::null();
        for _ in 0..400 {
            let with_joker = rng.gen_bool(0.5);
            let mut hand = HandIndex::new(random_hand(&mut rng, 16, with_joker));
            while !hand.is_empty() {
                let moves: Vec<Combo> = generate_legal(&hand, &null)
                    .into_iter()
                    .filter(|m| !m.is_pass())
                    .collect();
                assert!(!moves.is_empty());
                let m = moves[rng.gen_range(0..moves.len())];
                hand.reduce(&m);
                assert!(hand.verify(), "after {m} cards {}", hand.cards);
            }
        }
    }

    #[test]
    fn restore_is_the_inverse_of_reduce() {
        let mut rng = SmallRng::seed_from_u64(99);
        let null = Board::null();
        for _ in 0..400 {
            let with_joker = rng.gen_bool(0.5);
            let hand0 = HandIndex::new(random_hand(&mut rng, 14, with_joker));
            let moves: Vec<Combo> = generate_legal(&hand0, &null)
                .into_iter()
                .filter(|m| !m.is_pass())
                .collect();
            let m = moves[rng.gen_range(0..moves.len())];
            let mut hand = hand0;
            hand.reduce(&m);
            hand.restore(&m);
            assert_eq!(hand.cards, hand0.cards);
            assert!(hand.verify(), "after {m} on {}", hand0.cards);
        }
    }

    #[test]
    fn joker_only_removal_keeps_plain_tables() {
        let mut cards = CardSet::from_cards(&[
            CardId::of(Rank::QUEEN, Suit::Clubs),
            CardId::of(Rank::QUEEN, Suit::Spades),
        ]);
        cards.insert(CardId::JOKER);
        let mut hand = HandIndex::new(cards);
        let (qr, pqr, sc) = (hand.qr, hand.pqr, hand.sc);
        hand.reduce(&Combo::joker_single());
        assert_eq!((hand.qr, hand.pqr, hand.sc), (qr, pqr, sc));
        assert_eq!(hand.jokers, 0);
        assert!(hand.verify());
        hand.restore(&Combo::joker_single());
        assert_eq!(hand.jokers, 1);
        assert!(hand.verify());
    }

    #[test]
    fn group_with_joker_reduce() {
        let mut cards = CardSet::from_cards(&[
            CardId::of(Rank::NINE, Suit::Clubs),
            CardId::of(Rank::NINE, Suit::Diamonds),
            CardId::of(Rank::KING, Suit::Hearts),
        ]);
        cards.insert(CardId::JOKER);
        let mut hand = HandIndex::new(cards);
        let m = Combo::group_with_joker(Rank::NINE, SuitMask::new(0b0111), Suit::Hearts);
        hand.reduce(&m);
        assert_eq!(hand.qty, 1);
        assert!(hand.verify());
        hand.restore(&m);
        assert!(hand.verify());
    }
}
