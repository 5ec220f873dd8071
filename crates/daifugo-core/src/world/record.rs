//! Public information as seen from one seat.

use serde::{Deserialize, Serialize};

use crate::model::board::Board;
use crate::model::cardset::CardSet;
use crate::model::field::{Field, N_PLAYERS};

/// Everything one player can know for certain mid-game: their own cards,
/// the discard pile, public hand counts, the board, and per-seat
/// impossibility masks accumulated from observed passes and locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicRecord {
    pub my_seat: usize,
    pub my_cards: CardSet,
    /// Cards already played by anyone.
    pub used: CardSet,
    pub hand_sizes: [u8; N_PLAYERS],
    /// Cards seat `p` provably does not hold.
    pub impossible: [CardSet; N_PLAYERS],
    pub board: Board,
    pub turn: usize,
    pub owner: usize,
    pub alive: [bool; N_PLAYERS],
    pub awake: [bool; N_PLAYERS],
}

impl PublicRecord {
    /// Fresh-deal record from the perspective of `my_seat`.
    pub fn opening(my_seat: usize, my_cards: CardSet, hand_sizes: [u8; N_PLAYERS]) -> PublicRecord {
        PublicRecord {
            my_seat,
            my_cards,
            used: CardSet::EMPTY,
            hand_sizes,
            impossible: [CardSet::EMPTY; N_PLAYERS],
            board: Board::null(),
            turn: my_seat,
            owner: my_seat,
            alive: [true; N_PLAYERS],
            awake: [true; N_PLAYERS],
        }
    }

    /// Cards whose location is unknown to this seat.
    pub fn unseen(&self) -> CardSet {
        CardSet::ALL & !self.used & !self.my_cards
    }

    pub fn n_unseen(&self) -> u32 {
        self.unseen().count()
    }

    /// Cards seat `p` could hold, from this seat's point of view.
    pub fn possible(&self, p: usize) -> CardSet {
        if p == self.my_seat {
            self.my_cards
        } else {
            self.unseen() & !self.impossible[p]
        }
    }

    /// Record that seat `p` passed on (or could not beat) a board whose
    /// legal replies live in `zone`: every reply combination drawn purely
    /// from `zone` singles is now ruled out for simple shapes. Only the
    /// single-card case is sound in general, so that is all we rule out.
    pub fn note_exclusion(&mut self, p: usize, zone: CardSet) {
        if p != self.my_seat {
            self.impossible[p] |= zone;
        }
    }

    /// Materialize a full table state from sampled opponent hands.
    pub fn instantiate(&self, hands: [CardSet; N_PLAYERS]) -> Field {
        let mut classes = [None; N_PLAYERS];
        let mut n_done = 0u8;
        for p in 0..N_PLAYERS {
            if !self.alive[p] {
                classes[p] = Some(n_done);
                n_done += 1;
            }
        }
        Field::new(
            hands,
            self.board,
            self.turn,
            self.owner,
            self.alive,
            self.awake,
            classes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::PublicRecord;
    use crate::model::card::{CardId, Rank, Suit};
    use crate::model::cardset::CardSet;

    #[test]
    fn unseen_excludes_own_and_used() {
        let mine = CardSet::from_cards(&[CardId::DIAMOND3, CardId::JOKER]);
        let mut rec = PublicRecord::opening(0, mine, [11, 11, 11, 10, 10]);
        rec.used.insert(CardId::of(Rank::KING, Suit::Spades));
        let unseen = rec.unseen();
        assert_eq!(unseen.count(), 53 - 2 - 1);
        assert!(!unseen.contains(CardId::JOKER));
        assert!(!unseen.contains(CardId::of(Rank::KING, Suit::Spades)));
    }

    #[test]
    fn exclusion_narrows_possibility() {
        let mine = CardSet::single(CardId::DIAMOND3);
        let mut rec = PublicRecord::opening(0, mine, [1, 13, 13, 13, 13]);
        let twos = CardSet::rank_cards(Rank::TWO);
        rec.note_exclusion(2, twos);
        assert!(!rec.possible(2).intersects(twos));
        assert!(rec.possible(1).intersects(twos));
        // exclusions never touch the perspective seat
        rec.note_exclusion(0, CardSet::ALL);
        assert_eq!(rec.possible(0), mine);
    }

    #[test]
    fn record_round_trips_through_json() {
        let mine = CardSet::from_cards(&[CardId::DIAMOND3, CardId::JOKER]);
        let mut rec = PublicRecord::opening(1, mine, [11, 11, 11, 10, 10]);
        rec.note_exclusion(3, CardSet::rank_cards(Rank::TWO));
        let text = serde_json::to_string(&rec).unwrap();
        let back: PublicRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back.my_seat, 1);
        assert_eq!(back.my_cards, mine);
        assert_eq!(back.impossible[3], rec.impossible[3]);
    }
}
