use core::fmt;

use serde::{Deserialize, Serialize};

/// Rank index inside the 64-bit card layout.
///
/// Playable ranks run 1..=13 and map onto 3, 4, ..., K, A, 2 in game
/// strength order. Ranks 0 and 14 are sentinels so rank-range arithmetic
/// never walks off the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(u8);

impl Rank {
    pub const IMG_MIN: Rank = Rank(0);
    pub const MIN: Rank = Rank(1);
    pub const MAX: Rank = Rank(13);
    pub const IMG_MAX: Rank = Rank(14);

    pub const THREE: Rank = Rank(1);
    pub const FOUR: Rank = Rank(2);
    pub const FIVE: Rank = Rank(3);
    pub const SIX: Rank = Rank(4);
    pub const SEVEN: Rank = Rank(5);
    pub const EIGHT: Rank = Rank(6);
    pub const NINE: Rank = Rank(7);
    pub const TEN: Rank = Rank(8);
    pub const JACK: Rank = Rank(9);
    pub const QUEEN: Rank = Rank(10);
    pub const KING: Rank = Rank(11);
    pub const ACE: Rank = Rank(12);
    pub const TWO: Rank = Rank(13);

    pub const fn new(value: u8) -> Self {
        debug_assert!(value <= 15);
        Rank(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn offset(self, delta: i8) -> Rank {
        Rank((self.0 as i8 + delta) as u8)
    }

    pub const fn is_playable(self) -> bool {
        Self::MIN.0 <= self.0 && self.0 <= Self::MAX.0
    }

    const fn label(self) -> char {
        match self.0 {
            1 => '3',
            2 => '4',
            3 => '5',
            4 => '6',
            5 => '7',
            6 => '8',
            7 => '9',
            8 => 'T',
            9 => 'J',
            10 => 'Q',
            11 => 'K',
            12 => 'A',
            13 => '2',
            _ => '-',
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn from_index(index: u8) -> Suit {
        match index & 3 {
            0 => Suit::Clubs,
            1 => Suit::Diamonds,
            2 => Suit::Hearts,
            _ => Suit::Spades,
        }
    }

    pub const fn mask(self) -> SuitMask {
        SuitMask(1 << self.index())
    }

    const fn label(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 4-bit suit combination, one bit per suit in club/diamond/heart/spade order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SuitMask(u8);

impl SuitMask {
    pub const NONE: SuitMask = SuitMask(0);
    pub const ALL: SuitMask = SuitMask(0xF);

    pub const fn new(bits: u8) -> Self {
        SuitMask(bits & 0xF)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, suit: Suit) -> bool {
        self.0 & suit.mask().0 != 0
    }

    pub const fn with(self, suit: Suit) -> SuitMask {
        SuitMask(self.0 | suit.mask().0)
    }

    pub const fn without(self, suit: Suit) -> SuitMask {
        SuitMask(self.0 & !suit.mask().0)
    }

    pub const fn complement(self) -> SuitMask {
        SuitMask(!self.0 & 0xF)
    }

    pub fn lowest(self) -> Option<Suit> {
        if self.0 == 0 {
            None
        } else {
            Some(Suit::from_index(self.0.trailing_zeros() as u8))
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Suit> {
        Suit::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl fmt::Display for SuitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for suit in Suit::ALL {
            if self.contains(suit) {
                write!(f, "{suit}")?;
            }
        }
        Ok(())
    }
}

/// One card identity: bit index `rank * 4 + suit` in the packed layout,
/// with the joker parked at bit 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(u8);

impl CardId {
    pub const JOKER: CardId = CardId(60);
    pub const SPADE3: CardId = CardId::of(Rank::THREE, Suit::Spades);
    pub const DIAMOND3: CardId = CardId::of(Rank::THREE, Suit::Diamonds);

    pub const fn of(rank: Rank, suit: Suit) -> CardId {
        CardId((rank.value() << 2) | suit.index())
    }

    pub const fn from_index(index: u8) -> CardId {
        debug_assert!(index < 64);
        CardId(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn is_joker(self) -> bool {
        self.0 == Self::JOKER.0
    }

    pub const fn rank(self) -> Rank {
        Rank::new(self.0 >> 2)
    }

    pub const fn suit(self) -> Suit {
        Suit::from_index(self.0 & 3)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            write!(f, "JO")
        } else {
            write!(f, "{}{}", self.rank(), self.suit())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CardId, Rank, Suit};

    #[test]
    fn rank_layout_matches_strength_order() {
        assert!(Rank::THREE < Rank::EIGHT);
        assert!(Rank::ACE < Rank::TWO);
        assert_eq!(Rank::THREE.value(), 1);
        assert_eq!(Rank::TWO.value(), 13);
        assert!(!Rank::IMG_MIN.is_playable());
        assert!(!Rank::IMG_MAX.is_playable());
    }

    #[test]
    fn card_id_round_trips_rank_and_suit() {
        for r in 1..=13u8 {
            for s in 0..4u8 {
                let id = CardId::of(Rank::new(r), Suit::from_index(s));
                assert_eq!(id.rank().value(), r);
                assert_eq!(id.suit().index(), s);
                assert!(!id.is_joker());
            }
        }
        assert!(CardId::JOKER.is_joker());
        assert_eq!(CardId::JOKER.index(), 60);
    }

    #[test]
    fn suit_mask_algebra() {
        let cd = Suit::Clubs.mask().with(Suit::Diamonds);
        assert_eq!(cd.count(), 2);
        assert!(cd.contains(Suit::Clubs));
        assert!(!cd.contains(Suit::Spades));
        assert_eq!(cd.complement(), Suit::Hearts.mask().with(Suit::Spades));
        assert_eq!(cd.lowest(), Some(Suit::Clubs));
        assert_eq!(format!("{}", cd), "CD");
    }

    #[test]
    fn spade_three_identity() {
        assert_eq!(CardId::SPADE3.rank(), Rank::THREE);
        assert_eq!(CardId::SPADE3.suit(), Suit::Spades);
        assert_eq!(format!("{}", CardId::SPADE3), "3S");
    }
}
