use daifugo_core::model::board::Board;
use daifugo_core::model::card::Rank;
use daifugo_core::model::combo::Combo;
use daifugo_core::model::hand::HandIndex;

use super::PolicyOracle;

/// Linear scoring weights. Defaults are tuned for playouts that shed weak
/// cards early and hoard dominating material.
#[derive(Debug, Clone, Copy)]
pub struct PolicyParams {
    /// Per card played.
    pub qty_weight: f64,
    /// Per step of effective rank strength spent.
    pub rank_weight: f64,
    pub joker_penalty: f64,
    /// Playing part of a held set.
    pub break_penalty: f64,
    pub finish_bonus: f64,
    pub clear_bonus: f64,
    pub revolution_bonus: f64,
    pub pass_score: f64,
}

impl Default for PolicyParams {
    fn default() -> Self {
        PolicyParams {
            qty_weight: 0.8,
            rank_weight: 0.22,
            joker_penalty: 3.0,
            break_penalty: 1.2,
            finish_bonus: 30.0,
            clear_bonus: 0.5,
            revolution_bonus: 0.6,
            pass_score: -0.4,
        }
    }
}

/// Stateless heuristic policy over hand-local features.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicPolicy {
    pub params: PolicyParams,
}

impl HeuristicPolicy {
    pub fn new(params: PolicyParams) -> HeuristicPolicy {
        HeuristicPolicy { params }
    }

    fn score_one(&self, hand: &HandIndex, board: &Board, m: &Combo) -> f64 {
        let p = &self.params;
        if m.is_pass() {
            return p.pass_score;
        }
        if u32::from(m.qty()) == hand.qty {
            return p.finish_bonus;
        }
        let mut score = p.qty_weight * f64::from(m.qty());

        // effective strength spent, seen under the current order
        let rel = if board.order_reversed() {
            f64::from(Rank::MAX.value() + 1 - m.rank().value())
        } else {
            f64::from(m.rank().value())
        };
        score -= p.rank_weight * rel;

        if m.uses_joker() {
            score -= p.joker_penalty;
        }
        if !m.is_seq() {
            let held = (hand.qr >> (m.rank().value() * 4)) & 0xF;
            if held as u8 > m.qty() {
                score -= p.break_penalty;
            }
        }
        if m.dominates_inevitably() {
            score += p.clear_bonus;
        }
        if m.flips_order() {
            score += p.revolution_bonus;
        }
        score
    }
}

impl PolicyOracle for HeuristicPolicy {
    fn score_moves(&self, hand: &HandIndex, board: &Board, moves: &[Combo]) -> Vec<f64> {
        moves
            .iter()
            .map(|m| self.score_one(hand, board, m))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::HeuristicPolicy;
    use crate::policy::PolicyOracle;
    use daifugo_core::model::board::Board;
    use daifugo_core::model::card::{CardId, Rank, Suit, SuitMask};
    use daifugo_core::model::cardset::CardSet;
    use daifugo_core::model::combo::Combo;
    use daifugo_core::model::hand::HandIndex;

    fn hand_of(cards: &[CardId]) -> HandIndex {
        HandIndex::new(CardSet::from_cards(cards))
    }

    #[test]
    fn weak_singles_score_above_strong_ones() {
        let policy = HeuristicPolicy::default();
        let hand = hand_of(&[
            CardId::of(Rank::FOUR, Suit::Clubs),
            CardId::of(Rank::ACE, Suit::Clubs),
            CardId::of(Rank::SIX, Suit::Hearts),
        ]);
        let four = Combo::single(CardId::of(Rank::FOUR, Suit::Clubs));
        let ace = Combo::single(CardId::of(Rank::ACE, Suit::Clubs));
        let scores = policy.score_moves(&hand, &Board::null(), &[four, ace]);
        assert!(scores[0] > scores[1]);
        // reversed order flips which card is cheap
        let rev = Board::null_with_order(true);
        let scores = policy.score_moves(&hand, &rev, &[four, ace]);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn finishing_move_scores_highest() {
        let policy = HeuristicPolicy::default();
        let hand = hand_of(&[
            CardId::of(Rank::FOUR, Suit::Clubs),
            CardId::of(Rank::FOUR, Suit::Hearts),
        ]);
        let pair = Combo::group(Rank::FOUR, SuitMask::new(0b0101));
        let single = Combo::single(CardId::of(Rank::FOUR, Suit::Clubs));
        let scores = policy.score_moves(&hand, &Board::null(), &[single, pair]);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn breaking_a_set_is_penalized() {
        let policy = HeuristicPolicy::default();
        let hand = hand_of(&[
            CardId::of(Rank::FIVE, Suit::Clubs),
            CardId::of(Rank::FIVE, Suit::Hearts),
            CardId::of(Rank::SIX, Suit::Clubs),
            CardId::of(Rank::NINE, Suit::Clubs),
        ]);
        let five = Combo::single(CardId::of(Rank::FIVE, Suit::Clubs));
        let six = Combo::single(CardId::of(Rank::SIX, Suit::Clubs));
        let scores = policy.score_moves(&hand, &Board::null(), &[five, six]);
        // the five is weaker but splits a pair
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn joker_is_hoarded() {
        let policy = HeuristicPolicy::default();
        let hand = hand_of(&[
            CardId::JOKER,
            CardId::of(Rank::TWO, Suit::Clubs),
            CardId::of(Rank::FOUR, Suit::Clubs),
        ]);
        let two = Combo::single(CardId::of(Rank::TWO, Suit::Clubs));
        let jo = Combo::joker_single();
        let scores = policy.score_moves(&hand, &Board::null(), &[two, jo]);
        assert!(scores[0] > scores[1]);
    }
}
