//! Perfect-information endgame analysis.
//!
//! The mate search asks whether the mover can force their hand empty no
//! matter what the opponents hold back: every move in the winning line must
//! either finish the hand or dominate the pooled opponent cards so the lead
//! returns. Pooling the opponents overestimates their reply power, so a
//! `Win` verdict is always sound under any split of those cards.

use daifugo_core::model::board::Board;
use daifugo_core::model::combo::Combo;
use daifugo_core::model::field::Field;
use daifugo_core::model::hand::HandIndex;
use daifugo_core::play::dominance::dominates;
use daifugo_core::play::moves::generate_legal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Win,
    Lose,
    Unknown,
}

pub trait EndgameOracle: Sync {
    /// A first move of a forced finishing line, if one is found.
    fn winning_move(&self, hand: &HandIndex, board: &Board, ops: &HandIndex) -> Option<Combo>;

    /// Verdict for the seat on turn when only two players remain.
    fn judge_two_player(&self, field: &Field, seat: usize) -> Verdict {
        let ops = HandIndex::new(field.opponents_of(seat));
        match self.winning_move(field.hand(seat), &field.board, &ops) {
            Some(_) => Verdict::Win,
            None => Verdict::Unknown,
        }
    }
}

/// Depth-bounded mate search.
#[derive(Debug, Clone, Copy)]
pub struct MateOracle {
    pub max_depth: u32,
}

impl MateOracle {
    pub fn new(max_depth: u32) -> MateOracle {
        MateOracle { max_depth }
    }

    fn mate_from(&self, hand: &HandIndex, board: &Board, ops: &HandIndex, depth: u32) -> Option<Combo> {
        if depth == 0 {
            return None;
        }
        for m in generate_legal(hand, board) {
            if m.is_pass() {
                continue;
            }
            if u32::from(m.qty()) == hand.qty {
                return Some(m);
            }
            if !dominates(&m, board, ops) {
                continue;
            }
            // the trick flushes back to us; order effects persist
            let mut next = *board;
            next.apply(&m);
            next.clear();
            let mut rest = *hand;
            rest.reduce(&m);
            if self.mate_from(&rest, &next, ops, depth - 1).is_some() {
                return Some(m);
            }
        }
        None
    }
}

impl EndgameOracle for MateOracle {
    fn winning_move(&self, hand: &HandIndex, board: &Board, ops: &HandIndex) -> Option<Combo> {
        self.mate_from(hand, board, ops, self.max_depth)
    }
}

/// Disables endgame analysis; playouts run to the end on policy alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEndgame;

impl EndgameOracle for NoEndgame {
    fn winning_move(&self, _hand: &HandIndex, _board: &Board, _ops: &HandIndex) -> Option<Combo> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{EndgameOracle, MateOracle, NoEndgame};
    use daifugo_core::model::board::Board;
    use daifugo_core::model::card::{CardId, Rank, Suit};
    use daifugo_core::model::cardset::CardSet;
    use daifugo_core::model::hand::HandIndex;

    fn hand_of(cards: &[CardId]) -> HandIndex {
        HandIndex::new(CardSet::from_cards(cards))
    }

    fn mid_opponents() -> HandIndex {
        hand_of(&[
            CardId::of(Rank::SEVEN, Suit::Clubs),
            CardId::of(Rank::NINE, Suit::Hearts),
            CardId::of(Rank::TEN, Suit::Diamonds),
            CardId::of(Rank::JACK, Suit::Spades),
        ])
    }

    #[test]
    fn single_move_finish_is_a_mate() {
        let oracle = MateOracle::new(4);
        let hand = hand_of(&[CardId::of(Rank::FOUR, Suit::Clubs)]);
        let m = oracle.winning_move(&hand, &Board::null(), &mid_opponents());
        assert!(m.is_some());
    }

    #[test]
    fn dominating_pair_then_finish() {
        let oracle = MateOracle::new(4);
        // the twos dominate in any grouping, so the three finishes last
        let hand = hand_of(&[
            CardId::of(Rank::TWO, Suit::Clubs),
            CardId::of(Rank::TWO, Suit::Diamonds),
            CardId::of(Rank::THREE, Suit::Clubs),
        ]);
        let m = oracle
            .winning_move(&hand, &Board::null(), &mid_opponents())
            .unwrap();
        assert_eq!(m.rank(), Rank::TWO);
    }

    #[test]
    fn answerable_hand_is_not_a_mate() {
        let oracle = MateOracle::new(4);
        // both cards can be beaten, and neither dominates
        let hand = hand_of(&[
            CardId::of(Rank::FOUR, Suit::Clubs),
            CardId::of(Rank::FIVE, Suit::Clubs),
        ]);
        let ops = hand_of(&[
            CardId::of(Rank::KING, Suit::Clubs),
            CardId::of(Rank::ACE, Suit::Hearts),
        ]);
        assert!(oracle.winning_move(&hand, &Board::null(), &ops).is_none());
    }

    #[test]
    fn eight_cut_carries_the_lead() {
        let oracle = MateOracle::new(4);
        let hand = hand_of(&[
            CardId::of(Rank::EIGHT, Suit::Clubs),
            CardId::of(Rank::FOUR, Suit::Clubs),
        ]);
        // the eight clears the board, then the four finishes unopposed
        let m = oracle
            .winning_move(&hand, &Board::null(), &mid_opponents())
            .unwrap();
        assert_eq!(m.rank(), Rank::EIGHT);
    }

    #[test]
    fn disabled_oracle_reports_nothing() {
        let hand = hand_of(&[CardId::of(Rank::FOUR, Suit::Clubs)]);
        assert!(
            NoEndgame
                .winning_move(&hand, &Board::null(), &mid_opponents())
                .is_none()
        );
    }
}
