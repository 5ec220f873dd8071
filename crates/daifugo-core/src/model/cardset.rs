//! Bit-packed card sets and the run-detection bit tricks built on them.
//!
//! Bit `rank * 4 + suit` holds one ranked card, bit 60 holds the joker.
//! Sentinel ranks 0 and 14 never appear in a canonical set but keep the
//! rank-shift arithmetic total.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use serde::{Deserialize, Serialize};

use crate::model::card::{CardId, Rank, Suit, SuitMask};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct CardSet(u64);

impl CardSet {
    pub const EMPTY: CardSet = CardSet(0);
    /// All 52 ranked cards plus the joker.
    pub const ALL: CardSet = CardSet(0x10FF_FFFF_FFFF_FFF0);
    /// All 52 ranked cards, joker excluded.
    pub const PLAIN_ALL: CardSet = CardSet(0x00FF_FFFF_FFFF_FFF0);
    /// Ranked layout including the sentinel ranks, joker excluded.
    pub const IMG_PLAIN_ALL: CardSet = CardSet(0x0FFF_FFFF_FFFF_FFFF);
    pub const JOKER: CardSet = CardSet(1 << 60);

    pub const fn from_bits(bits: u64) -> CardSet {
        CardSet(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn single(card: CardId) -> CardSet {
        CardSet(1 << card.index())
    }

    pub fn from_cards(cards: &[CardId]) -> CardSet {
        let mut set = CardSet::EMPTY;
        for &c in cards {
            set.insert(c);
        }
        set
    }

    pub const fn contains(self, card: CardId) -> bool {
        self.0 & (1 << card.index()) != 0
    }

    pub const fn contains_all(self, other: CardSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: CardSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, card: CardId) {
        self.0 |= 1 << card.index();
    }

    pub fn remove(&mut self, card: CardId) {
        self.0 &= !(1 << card.index());
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn has_joker(self) -> bool {
        self.0 & Self::JOKER.0 != 0
    }

    /// Joker count, 0 or 1.
    pub const fn jokers(self) -> u32 {
        (self.0 >> 60) as u32 & 1
    }

    pub const fn plain(self) -> CardSet {
        CardSet(self.0 & !Self::JOKER.0)
    }

    pub fn lowest(self) -> Option<CardId> {
        if self.0 == 0 {
            None
        } else {
            Some(CardId::from_index(self.0.trailing_zeros() as u8))
        }
    }

    pub fn highest(self) -> Option<CardId> {
        if self.0 == 0 {
            None
        } else {
            Some(CardId::from_index(63 - self.0.leading_zeros() as u8))
        }
    }

    pub fn iter(self) -> CardIter {
        CardIter(self.0)
    }

    /// All four cards of one rank.
    pub const fn rank_cards(rank: Rank) -> CardSet {
        CardSet(0xF << (rank.value() * 4))
    }

    /// All cards of ranks `lo..=hi`; empty when the range is inverted.
    pub const fn rank_range(lo: u8, hi: u8) -> CardSet {
        if lo > hi || lo > 15 {
            return CardSet::EMPTY;
        }
        let top = if hi >= 15 {
            u64::MAX
        } else {
            (1u64 << ((hi + 1) * 4)) - 1
        };
        CardSet(top & !((1u64 << (lo * 4)) - 1))
    }

    /// The thirteen-card columns of the given suits.
    pub const fn suit_cards(suits: SuitMask) -> CardSet {
        let mut bits = 0u64;
        let mut s = 0;
        while s < 4 {
            if suits.bits() & (1 << s) != 0 {
                bits |= 0x1111_1111_1111_1111 << s;
            }
            s += 1;
        }
        CardSet(bits & Self::PLAIN_ALL.0)
    }

    /// The cards at one rank restricted to the given suits.
    pub const fn of(rank: Rank, suits: SuitMask) -> CardSet {
        CardSet((suits.bits() as u64) << (rank.value() * 4))
    }

    /// One suit column over `qty` consecutive ranks starting at `rank`.
    pub const fn run(rank: Rank, suit: Suit, qty: u8) -> CardSet {
        let lo = rank.value();
        CardSet(
            CardSet::rank_range(lo, lo + qty - 1).0 & CardSet::suit_cards(suit.mask()).0,
        )
    }
}

impl BitOr for CardSet {
    type Output = CardSet;
    fn bitor(self, rhs: CardSet) -> CardSet {
        CardSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for CardSet {
    fn bitor_assign(&mut self, rhs: CardSet) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CardSet {
    type Output = CardSet;
    fn bitand(self, rhs: CardSet) -> CardSet {
        CardSet(self.0 & rhs.0)
    }
}

impl BitAndAssign for CardSet {
    fn bitand_assign(&mut self, rhs: CardSet) {
        self.0 &= rhs.0;
    }
}

impl BitXor for CardSet {
    type Output = CardSet;
    fn bitxor(self, rhs: CardSet) -> CardSet {
        CardSet(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for CardSet {
    fn bitxor_assign(&mut self, rhs: CardSet) {
        self.0 ^= rhs.0;
    }
}

impl Not for CardSet {
    type Output = CardSet;
    fn not(self) -> CardSet {
        CardSet(!self.0)
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for card in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{card}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

pub struct CardIter(u64);

impl Iterator for CardIter {
    type Item = CardId;

    fn next(&mut self) -> Option<CardId> {
        if self.0 == 0 {
            None
        } else {
            let idx = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            Some(CardId::from_index(idx))
        }
    }
}

// ---------------------------------------------------------------------------
// Run detection.
//
// A bit at (rank, suit) in the results below talks about a run starting at
// that rank in that suit lane. Shifting by 4 moves one rank; the suit lanes
// never mix.

/// Start positions of plain runs of length `n`: AND of `n` rank-shifted
/// copies.
pub fn polym_ranks(cards: CardSet, n: u8) -> CardSet {
    if n == 0 {
        return CardSet::EMPTY;
    }
    let c = cards.bits();
    let mut ret = c;
    for i in 1..n as u32 {
        ret &= c >> (i * 4);
    }
    CardSet(ret)
}

/// Inverse expansion: from start positions back to the full run coverage.
pub fn extract_ranks(starts: CardSet, n: u8) -> CardSet {
    if n == 0 {
        return CardSet::EMPTY;
    }
    let c = starts.bits();
    let mut ret = c;
    for i in 1..n as u32 {
        ret |= c << (i * 4);
    }
    CardSet(ret)
}

/// Start positions of `qty`-runs makeable with one joker available: windows
/// missing at most one rank. Case analysis avoids any per-rank loop; the
/// final mask drops starts whose window would run past the playable span.
pub fn polym_ranks_with_joker(plain: CardSet, qty: u8) -> CardSet {
    let c = plain.bits();
    let r = match qty {
        1 => CardSet::PLAIN_ALL.0,
        2 => c | (c >> 4),
        3 => {
            let d = c & (c >> 4);
            (d | (d >> 4)) | (c & (c >> 8))
        }
        4 => {
            let d = c & (c >> 4);
            let mut f = (d & (c >> 12)) | (c & (d >> 8));
            let e = d & (c >> 8);
            if e != 0 {
                f |= e | (e >> 4);
            }
            f
        }
        5 => {
            let d = c & (c >> 4);
            let mut g = d & (d >> 12);
            let e = d & (c >> 8);
            if e != 0 {
                g |= (e & (c >> 16)) | (c & (e >> 8));
                let f = e & (c >> 12);
                if f != 0 {
                    g |= f | (f >> 4);
                }
            }
            g
        }
        _ => return CardSet::EMPTY,
    };
    CardSet(r) & seq_existable_zone(qty)
}

/// Start positions of `qty`-runs given the joker count.
pub fn run_starts(plain: CardSet, jokers: u32, qty: u8) -> CardSet {
    if jokers == 0 {
        polym_ranks(plain, qty)
    } else {
        polym_ranks_with_joker(plain, qty)
    }
}

// Possibility masks for joker-completed runs: a bit at (r, s) means some
// (qty-1)-subset of the window r..r+qty-1 containing r is fully present in
// suit s. Shift-AND compositions, no enumeration.

pub fn can_make_joker_seq2(plain: CardSet) -> CardSet {
    plain
}

pub fn can_make_joker_seq3(plain: CardSet) -> CardSet {
    let c = plain.bits();
    CardSet((c & (c >> 4)) | (c & (c >> 8)))
}

pub fn can_make_joker_seq4(plain: CardSet) -> CardSet {
    let c = plain.bits();
    let c12 = c & (c >> 4);
    let c3 = c >> 8;
    let c4 = c >> 12;
    CardSet((c12 & c3) | (c12 & c4) | (c & c3 & c4))
}

pub fn can_make_joker_seq5(plain: CardSet) -> CardSet {
    let c = plain.bits();
    let c12 = c & (c >> 4);
    let c3 = c >> 8;
    let c4 = c >> 12;
    let c5 = c >> 16;
    let c45 = c4 & c5;
    CardSet((c12 & c3 & c4) | (c12 & c3 & c5) | (c12 & c45) | (c & c3 & c45))
}

pub fn can_make_plain_seq(plain: CardSet, qty: u8) -> CardSet {
    debug_assert!(!plain.has_joker());
    polym_ranks(plain, qty)
}

pub fn can_make_joker_seq(plain: CardSet, jokers: u32, qty: u8) -> CardSet {
    debug_assert!(!plain.has_joker());
    if jokers == 0 {
        return CardSet::EMPTY;
    }
    match qty {
        2 => can_make_joker_seq2(plain),
        3 => can_make_joker_seq3(plain),
        4 => can_make_joker_seq4(plain),
        5 => can_make_joker_seq5(plain),
        _ => CardSet::EMPTY,
    }
}

pub fn can_make_seq(plain: CardSet, jokers: u32, qty: u8) -> CardSet {
    if jokers == 0 {
        can_make_plain_seq(plain, qty)
    } else {
        can_make_joker_seq(plain, jokers, qty)
    }
}

// ---------------------------------------------------------------------------
// Legal zones for a fixed required rank/quantity/order.

/// Ranks a single or group must land in to answer a required rank.
pub fn group_valid_zone(reversed: bool, rank: Rank) -> CardSet {
    if reversed {
        CardSet::rank_range(Rank::MIN.value(), rank.value().wrapping_sub(1))
    } else {
        CardSet::rank_range(rank.value() + 1, Rank::MAX.value())
    }
}

/// Start ranks a `qty`-run must land in to answer a required run start.
pub fn seq_valid_zone(reversed: bool, rank: Rank, qty: u8) -> CardSet {
    if reversed {
        if rank.value() <= qty {
            CardSet::EMPTY
        } else {
            CardSet::rank_range(Rank::MIN.value(), rank.value() - qty)
        }
    } else {
        CardSet::rank_range(rank.value() + qty, Rank::MAX.value())
    }
}

pub fn is_valid_group_rank(mv_rank: Rank, reversed: bool, bd_rank: Rank) -> bool {
    if reversed {
        mv_rank < bd_rank
    } else {
        mv_rank > bd_rank
    }
}

pub fn is_valid_seq_rank(mv_rank: Rank, reversed: bool, bd_rank: Rank, qty: u8) -> bool {
    if reversed {
        mv_rank.value() + qty <= bd_rank.value()
    } else {
        mv_rank.value() >= bd_rank.value() + qty
    }
}

/// Start ranks at which a `qty`-run fits inside the playable rank span.
pub fn seq_existable_zone(qty: u8) -> CardSet {
    CardSet::rank_range(Rank::MIN.value(), Rank::MAX.value() + 1 - qty)
}
