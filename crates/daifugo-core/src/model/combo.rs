//! Playable combinations as explicit tagged records.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::model::card::{CardId, Rank, Suit, SuitMask};
use crate::model::cardset::CardSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Pass,
    Single,
    Group,
    Sequence,
}

/// How the joker takes part in a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JokerUse {
    None,
    /// Played by itself.
    Lone,
    /// Fills one suit slot of a group; the suit it stands for matters for
    /// suit locking. A five-card group carries all four real suits and the
    /// represented suit is meaningless.
    Group { suit: Suit },
    /// Substitutes one rank inside a run.
    Sequence { rank: Rank },
}

/// One playable combination. Shape and quantity decide which fields carry
/// meaning; a `Pass` ignores all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combo {
    shape: Shape,
    qty: u8,
    rank: Rank,
    suits: SuitMask,
    joker: JokerUse,
}

impl Combo {
    pub const PASS: Combo = Combo {
        shape: Shape::Pass,
        qty: 0,
        rank: Rank::IMG_MIN,
        suits: SuitMask::NONE,
        joker: JokerUse::None,
    };

    pub fn single(card: CardId) -> Combo {
        if card.is_joker() {
            return Combo::joker_single();
        }
        Combo {
            shape: Shape::Single,
            qty: 1,
            rank: card.rank(),
            suits: card.suit().mask(),
            joker: JokerUse::None,
        }
    }

    pub const fn joker_single() -> Combo {
        Combo {
            shape: Shape::Single,
            qty: 1,
            rank: Rank::IMG_MIN,
            suits: SuitMask::NONE,
            joker: JokerUse::Lone,
        }
    }

    pub fn group(rank: Rank, suits: SuitMask) -> Combo {
        debug_assert!(suits.count() >= 2);
        Combo {
            shape: Shape::Group,
            qty: suits.count() as u8,
            rank,
            suits,
            joker: JokerUse::None,
        }
    }

    /// Group with the joker standing in for `joker_suit`; `suits` already
    /// includes the represented suit.
    pub fn group_with_joker(rank: Rank, suits: SuitMask, joker_suit: Suit) -> Combo {
        debug_assert!(suits.contains(joker_suit));
        Combo {
            shape: Shape::Group,
            qty: suits.count() as u8,
            rank,
            suits,
            joker: JokerUse::Group { suit: joker_suit },
        }
    }

    /// All four cards of a rank plus the joker.
    pub fn quintuple(rank: Rank) -> Combo {
        Combo {
            shape: Shape::Group,
            qty: 5,
            rank,
            suits: SuitMask::ALL,
            joker: JokerUse::Group { suit: Suit::Clubs },
        }
    }

    pub fn sequence(rank: Rank, suit: Suit, qty: u8) -> Combo {
        debug_assert!((3..=5).contains(&qty));
        Combo {
            shape: Shape::Sequence,
            qty,
            rank,
            suits: suit.mask(),
            joker: JokerUse::None,
        }
    }

    /// Run with the joker substituting `joker_rank` (inside the run span).
    pub fn sequence_with_joker(rank: Rank, suit: Suit, qty: u8, joker_rank: Rank) -> Combo {
        debug_assert!((3..=5).contains(&qty));
        debug_assert!(rank <= joker_rank && joker_rank.value() < rank.value() + qty);
        Combo {
            shape: Shape::Sequence,
            qty,
            rank,
            suits: suit.mask(),
            joker: JokerUse::Sequence { rank: joker_rank },
        }
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

    pub const fn joker(self) -> JokerUse {
        self.joker
    }

    pub const fn is_pass(self) -> bool {
        matches!(self.shape, Shape::Pass)
    }

    pub const fn is_single(self) -> bool {
        matches!(self.shape, Shape::Single)
    }

    pub const fn is_group(self) -> bool {
        matches!(self.shape, Shape::Group)
    }

    pub const fn is_seq(self) -> bool {
        matches!(self.shape, Shape::Sequence)
    }

    pub const fn is_joker_single(self) -> bool {
        matches!(self.joker, JokerUse::Lone)
    }

    pub const fn uses_joker(self) -> bool {
        !matches!(self.joker, JokerUse::None)
    }

    pub fn joker_rank(self) -> Option<Rank> {
        match self.joker {
            JokerUse::Sequence { rank } => Some(rank),
            _ => None,
        }
    }

    /// The 3 of spades played as a single, the one reply to a lone joker.
    pub fn is_counter_single(self) -> bool {
        self.shape == Shape::Single
            && self.joker == JokerUse::None
            && self.rank == Rank::THREE
            && self.suits == Suit::Spades.mask()
    }

    /// Rank-8 cut: clears the board no matter what anyone holds.
    pub fn dominates_inevitably(self) -> bool {
        match self.shape {
            Shape::Pass => false,
            Shape::Single | Shape::Group => self.rank == Rank::EIGHT,
            Shape::Sequence => {
                self.rank <= Rank::EIGHT
                    && Rank::EIGHT.value() < self.rank.value() + self.qty
                    && self.joker_rank() != Some(Rank::EIGHT)
            }
        }
    }

    /// Revolution: four-of-a-kind groups and five-card runs reverse the
    /// rank order, persistently.
    pub fn flips_order(self) -> bool {
        match self.shape {
            Shape::Group => self.qty >= 4,
            Shape::Sequence => self.qty >= 5,
            _ => false,
        }
    }

    /// Materialize the exact cards the combination spends.
    pub fn cards(self) -> CardSet {
        match self.shape {
            Shape::Pass => CardSet::EMPTY,
            Shape::Single => match self.joker {
                JokerUse::Lone => CardSet::JOKER,
                _ => CardSet::of(self.rank, self.suits),
            },
            Shape::Group => match self.joker {
                JokerUse::Group { suit } => {
                    let real = if self.qty >= 5 {
                        SuitMask::ALL
                    } else {
                        self.suits.without(suit)
                    };
                    CardSet::of(self.rank, real) | CardSet::JOKER
                }
                _ => CardSet::of(self.rank, self.suits),
            },
            Shape::Sequence => {
                let suit = match self.suits.lowest() {
                    Some(s) => s,
                    None => return CardSet::EMPTY,
                };
                let full = CardSet::run(self.rank, suit, self.qty);
                match self.joker {
                    JokerUse::Sequence { rank } => {
                        (full & !CardSet::rank_cards(rank)) | CardSet::JOKER
                    }
                    _ => full,
                }
            }
        }
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Pass => write!(f, "PASS"),
            Shape::Single => {
                if self.is_joker_single() {
                    write!(f, "JO")
                } else {
                    write!(f, "{}{}", self.rank, self.suits)
                }
            }
            Shape::Group => {
                write!(f, "{}[{}]", self.rank, self.suits)?;
                if let JokerUse::Group { suit } = self.joker {
                    write!(f, "*{suit}")?;
                }
                Ok(())
            }
            Shape::Sequence => {
                write!(
                    f,
                    "{}-{}[{}]",
                    self.rank,
                    Rank::new(self.rank.value() + self.qty - 1),
                    self.suits
                )?;
                if let JokerUse::Sequence { rank } = self.joker {
                    write!(f, "*{rank}")?;
                }
                Ok(())
            }
        }
    }
}
