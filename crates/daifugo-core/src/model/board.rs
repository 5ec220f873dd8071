//! Board state and the combination-application transition.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::model::card::{Rank, SuitMask};
use crate::model::cardset::{
    self, CardSet, group_valid_zone, is_valid_group_rank, is_valid_seq_rank, seq_valid_zone,
};
use crate::model::combo::{Combo, Shape};

/// The combination currently required to beat, plus order and lock flags.
///
/// A null board (shape `Pass`) accepts any lead. Clearing keeps only the
/// order bits; the persistent order survives clears, the temporary one is
/// this rule set's hook for order effects that would end with the trick
/// (none exist under current rules, so the two flip together).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    shape: Shape,
    qty: u8,
    rank: Rank,
    suits: SuitMask,
    joker_single: bool,
    tmp_order_rev: bool,
    prm_order_rev: bool,
    suits_locked: bool,
    invalid: bool,
}

impl Default for Board {
    fn default() -> Self {
        Board::null()
    }
}

impl Board {
    pub const fn null() -> Board {
        Board {
            shape: Shape::Pass,
            qty: 0,
            rank: Rank::IMG_MIN,
            suits: SuitMask::NONE,
            joker_single: false,
            tmp_order_rev: false,
            prm_order_rev: false,
            suits_locked: false,
            invalid: false,
        }
    }

    pub const fn null_with_order(reversed: bool) -> Board {
        Board {
            tmp_order_rev: reversed,
            prm_order_rev: reversed,
            ..Board::null()
        }
    }

    pub const fn is_null(self) -> bool {
        matches!(self.shape, Shape::Pass)
    }

    pub const fn shape(self) -> Shape {
        self.shape
    }

    pub const fn qty(self) -> u8 {
        self.qty
    }

    pub const fn rank(self) -> Rank {
        self.rank
    }

    pub const fn suits(self) -> SuitMask {
        self.suits
    }

    /// Effective rank order right now.
    pub const fn order_reversed(self) -> bool {
        self.tmp_order_rev
    }

    pub const fn prm_order_reversed(self) -> bool {
        self.prm_order_rev
    }

    pub const fn suits_locked(self) -> bool {
        self.suits_locked
    }

    pub const fn is_single_joker(self) -> bool {
        self.joker_single
    }

    pub const fn is_invalid(self) -> bool {
        self.invalid
    }

    pub fn mark_invalid(&mut self) {
        self.invalid = true;
    }

    fn locks_suits(self, m: &Combo) -> bool {
        !self.is_null() && self.suits == m.suits()
    }

    /// Clear to a null board, keeping only the order bits.
    pub fn clear(&mut self) {
        let (tmp, prm, invalid) = (self.tmp_order_rev, self.prm_order_rev, self.invalid);
        *self = Board::null();
        self.tmp_order_rev = tmp;
        self.prm_order_rev = prm;
        self.invalid = invalid;
    }

    /// Total transition: order flips, then domination clears, then the
    /// required-combination replacement with suit-lock assertion.
    pub fn apply(&mut self, m: &Combo) {
        if m.is_pass() {
            return;
        }
        if m.flips_order() {
            self.tmp_order_rev = !self.tmp_order_rev;
            self.prm_order_rev = !self.prm_order_rev;
        }
        if m.dominates_inevitably() {
            self.clear();
            return;
        }
        if !self.is_null() && self.joker_single && m.is_counter_single() {
            self.clear();
            return;
        }
        if !self.suits_locked && self.locks_suits(m) {
            self.suits_locked = true;
        }
        self.shape = m.shape();
        self.qty = m.qty();
        self.rank = m.rank();
        self.suits = m.suits();
        self.joker_single = m.is_joker_single();
    }

    /// Apply and then force a clear; used for protocol shortcuts where the
    /// move is known to end the trick. Idempotent on a null board.
    pub fn apply_and_clear(&mut self, m: &Combo) {
        if !m.is_pass() && m.flips_order() {
            self.tmp_order_rev = !self.tmp_order_rev;
            self.prm_order_rev = !self.prm_order_rev;
        }
        self.clear();
    }

    /// Objective legality against the board alone, ignoring whose cards
    /// they are. The caller checks card ownership separately.
    pub fn accepts(self, m: &Combo) -> bool {
        if m.is_pass() {
            return true;
        }
        if self.is_null() {
            return !m.is_pass();
        }
        if self.joker_single {
            return m.is_counter_single();
        }
        if m.is_joker_single() {
            return self.shape == Shape::Single;
        }
        if m.shape() != self.shape || m.qty() != self.qty {
            return false;
        }
        match m.shape() {
            Shape::Sequence => {
                if !is_valid_seq_rank(m.rank(), self.tmp_order_rev, self.rank, m.qty()) {
                    return false;
                }
                !self.suits_locked || self.suits == m.suits()
            }
            _ => {
                if !is_valid_group_rank(m.rank(), self.tmp_order_rev, self.rank) {
                    return false;
                }
                !self.suits_locked || self.suits == m.suits()
            }
        }
    }

    /// The card-space zone where a legal reply can live; used by the
    /// domination tests. Null boards accept everything.
    pub fn legal_zone(self) -> CardSet {
        if self.is_null() {
            return CardSet::ALL;
        }
        if self.joker_single {
            return CardSet::single(crate::model::card::CardId::SPADE3);
        }
        let zone = match self.shape {
            Shape::Sequence => seq_valid_zone(self.tmp_order_rev, self.rank, self.qty),
            _ => group_valid_zone(self.tmp_order_rev, self.rank),
        };
        let zone = if self.suits_locked {
            zone & cardset::CardSet::suit_cards(self.suits)
        } else {
            zone
        };
        zone | CardSet::JOKER
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "NULL")?;
        } else if self.joker_single {
            write!(f, "JO")?;
        } else {
            write!(f, "{}x{}[{}]", self.rank, self.qty, self.suits)?;
        }
        write!(
            f,
            "  order:{}  suits:{}",
            if self.tmp_order_rev { "REV" } else { "NORMAL" },
            if self.suits_locked { "LOCKED" } else { "FREE" }
        )
    }
}
