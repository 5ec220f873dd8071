//! Top-level play and exchange decisions.

use tracing::debug;

use daifugo_core::model::board::Board;
use daifugo_core::model::card::CardId;
use daifugo_core::model::cardset::CardSet;
use daifugo_core::model::combo::Combo;
use daifugo_core::model::hand::HandIndex;
use daifugo_core::play::dominance::{board_dominates, dominates};
use daifugo_core::play::moves::generate_legal;
use daifugo_core::world::record::PublicRecord;

use crate::config::{RewardTable, SearchConfig, SelectorKind};
use crate::oracle::{EndgameOracle, MateOracle};
use crate::policy::{HeuristicPolicy, PolicyOracle};
use crate::search::{self, RootAction};
use crate::sim::selector::Selector;

/// How each candidate relates to the pooled opponent cards.
#[derive(Debug, Clone, Copy)]
struct Annotation {
    finish: bool,
    mate: bool,
    full_clear: bool,
    self_dominating: bool,
}

pub struct Engine {
    pub config: SearchConfig,
    pub rewards: RewardTable,
    policy: HeuristicPolicy,
    oracle: MateOracle,
}

impl Engine {
    pub fn new(config: SearchConfig) -> Engine {
        let oracle = MateOracle::new(config.mate_depth);
        Engine {
            config,
            rewards: RewardTable::default(),
            policy: HeuristicPolicy::default(),
            oracle,
        }
    }

    /// Chooses the move for the seat on turn in `record`.
    pub fn decide_play(&self, record: &PublicRecord) -> Combo {
        if record.board.is_invalid() {
            return Combo::PASS;
        }
        let hand = HandIndex::new(record.my_cards);
        let moves = generate_legal(&hand, &record.board);
        if moves.len() == 1 {
            return moves[0];
        }

        if self.config.use_mate_search {
            let ops = HandIndex::new(record.unseen());
            let notes: Vec<Annotation> = moves
                .iter()
                .map(|m| self.annotate(m, &hand, &record.board, &ops))
                .collect();
            if let Some(best) = pick_confirmed_win(&moves, &notes) {
                debug!(candidates = moves.len(), "confirmed win, skipping search");
                return best;
            }
        }

        self.search_play(record, &hand, moves)
    }

    fn search_play(&self, record: &PublicRecord, hand: &HandIndex, moves: Vec<Combo>) -> Combo {
        let scores = self.policy.score_moves(hand, &record.board, &moves);
        let priors = priors_from_scores(&scores);
        let actions: Vec<RootAction> = moves.iter().map(|m| RootAction::Play(*m)).collect();
        let cap = self.config.play_simulation_cap(moves.len());

        let root = search::run_search(
            record,
            actions,
            &priors,
            &self.config,
            self.rewards,
            &self.oracle,
            &self.policy,
            cap,
        );
        debug!(
            candidates = moves.len(),
            simulations = root.total_observations(),
            elapsed_ms = root.started.elapsed().as_millis() as u64,
            "play search finished"
        );
        if root.total_observations() == 0 {
            // sampling failed outright; fall back to the policy prior
            let best = argmax(&priors);
            return moves[best];
        }
        moves[root.best_index()]
    }

    /// Chooses `count` cards to hand over to seat `to` in the pre-round
    /// exchange.
    pub fn decide_change(&self, record: &PublicRecord, to: usize, count: usize) -> CardSet {
        if count == 0 {
            return CardSet::EMPTY;
        }
        let candidates = change_candidates(record.my_cards, count);
        debug_assert!(!candidates.is_empty());
        if candidates.len() == 1 {
            return candidates[0];
        }

        if self.config.use_mate_search {
            let ops = HandIndex::new(record.unseen());
            for &cards in &candidates {
                let rest = HandIndex::new(record.my_cards & !cards);
                if self
                    .oracle
                    .winning_move(&rest, &Board::null(), &ops)
                    .is_some()
                {
                    debug!("exchange keeps a mate in hand");
                    return cards;
                }
            }
        }

        let priors = change_priors(&candidates);
        let actions: Vec<RootAction> = candidates
            .iter()
            .map(|&cards| RootAction::Change { cards, to })
            .collect();
        let cap = self.config.change_simulation_cap(candidates.len());
        let root = search::run_search(
            record,
            actions,
            &priors,
            &self.config,
            self.rewards,
            &self.oracle,
            &self.policy,
            cap,
        );
        debug!(
            candidates = candidates.len(),
            simulations = root.total_observations(),
            "change search finished"
        );
        if root.total_observations() == 0 {
            return candidates[argmax(&priors)];
        }
        candidates[root.best_index()]
    }

    fn annotate(&self, m: &Combo, hand: &HandIndex, board: &Board, ops: &HandIndex) -> Annotation {
        if m.is_pass() {
            return Annotation {
                finish: false,
                mate: false,
                full_clear: false,
                self_dominating: false,
            };
        }
        let finish = u32::from(m.qty()) == hand.qty;
        let mut after = *board;
        after.apply(m);
        let full_clear = after.is_null();

        let mut rest = *hand;
        rest.reduce(m);
        let self_dominating = board_dominates(&after, &rest);

        let mate = finish
            || (dominates(m, board, ops) && {
                let mut cleared = after;
                cleared.clear();
                self.oracle.winning_move(&rest, &cleared, ops).is_some()
            });
        Annotation {
            finish,
            mate,
            full_clear,
            self_dominating,
        }
    }
}

/// Deterministic tie-break among confirmed winning lines: finish now, then
/// keep the lead by clearing, then shed the most cards, then prefer plays
/// the opponents can never answer, then plays we can still follow up.
fn pick_confirmed_win(moves: &[Combo], notes: &[Annotation]) -> Option<Combo> {
    let mut best: Option<(Combo, (bool, bool, u8, bool, bool))> = None;
    for (m, note) in moves.iter().zip(notes) {
        if !note.mate {
            continue;
        }
        let key = (
            note.finish,
            note.full_clear,
            m.qty(),
            m.dominates_inevitably(),
            !note.self_dominating,
        );
        match &best {
            Some((_, best_key)) if *best_key >= key => {}
            _ => best = Some((*m, key)),
        }
    }
    best.map(|(m, _)| m)
}

/// Maps policy scores to prior mean rewards in `[0.25, 0.75]`.
fn priors_from_scores(scores: &[f64]) -> Vec<f64> {
    let selector = Selector::new(SelectorKind::Softmax, 1.0, 0.0);
    let probs = selector.probabilities(scores);
    let top = probs.iter().copied().fold(f64::MIN, f64::max).max(1e-9);
    probs.iter().map(|p| 0.25 + 0.5 * (p / top)).collect()
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Exchange candidates: subsets of the weakest cards, never the joker or
/// the counter single, and never cards from a made revolution set.
fn change_candidates(hand: CardSet, count: usize) -> Vec<CardSet> {
    let mut pool: Vec<CardId> = hand
        .plain()
        .iter()
        .filter(|c| *c != CardId::SPADE3)
        .filter(|c| (hand & CardSet::rank_cards(c.rank())).count() < 4)
        .collect();
    pool.sort_by_key(|c| c.rank().value());
    if pool.len() < count {
        // too constrained; allow everything but the joker
        pool = hand.plain().iter().collect();
        pool.sort_by_key(|c| c.rank().value());
    }
    pool.truncate(count + 4);
    let mut out = Vec::new();
    subsets(&pool, count, 0, CardSet::EMPTY, &mut out);
    if out.is_empty() {
        out.push(CardSet::EMPTY);
    }
    out
}

fn subsets(pool: &[CardId], left: usize, from: usize, acc: CardSet, out: &mut Vec<CardSet>) {
    if left == 0 {
        out.push(acc);
        return;
    }
    for i in from..pool.len() {
        if pool.len() - i < left {
            break;
        }
        let mut next = acc;
        next.insert(pool[i]);
        subsets(pool, left - 1, i + 1, next, out);
    }
}

/// Giving weak cards is a priori better; map total strength given away to
/// prior means in `[0.3, 0.7]`.
fn change_priors(candidates: &[CardSet]) -> Vec<f64> {
    let strengths: Vec<f64> = candidates
        .iter()
        .map(|c| c.iter().map(|card| f64::from(card.rank().value())).sum())
        .collect();
    let lo = strengths.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = strengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (hi - lo).max(1e-9);
    strengths
        .iter()
        .map(|s| 0.7 - 0.4 * ((s - lo) / span))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Engine, change_candidates};
    use crate::config::SearchConfig;
    use daifugo_core::model::card::{CardId, Rank, Suit};
    use daifugo_core::model::cardset::CardSet;
    use daifugo_core::world::record::PublicRecord;

    fn quiet_config() -> SearchConfig {
        SearchConfig {
            threads: 1,
            seed: Some(7),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn invalid_board_yields_pass() {
        let engine = Engine::new(quiet_config());
        let mine = CardSet::from_cards(&[CardId::DIAMOND3]);
        let mut record = PublicRecord::opening(0, mine, [1, 13, 13, 13, 13]);
        record.board.mark_invalid();
        assert!(engine.decide_play(&record).is_pass());
    }

    #[test]
    fn lone_legal_move_skips_search() {
        let engine = Engine::new(quiet_config());
        let mine = CardSet::from_cards(&[CardId::of(Rank::NINE, Suit::Clubs)]);
        let record = PublicRecord::opening(0, mine, [1, 13, 13, 13, 13]);
        let m = engine.decide_play(&record);
        assert_eq!(m.rank(), Rank::NINE);
    }

    #[test]
    fn change_candidates_protect_key_cards() {
        let hand = CardSet::from_cards(&[
            CardId::SPADE3,
            CardId::JOKER,
            CardId::of(Rank::FOUR, Suit::Clubs),
            CardId::of(Rank::FIVE, Suit::Clubs),
            CardId::of(Rank::SIX, Suit::Clubs),
            CardId::of(Rank::SIX, Suit::Diamonds),
            CardId::of(Rank::SIX, Suit::Hearts),
            CardId::of(Rank::SIX, Suit::Spades),
            CardId::of(Rank::KING, Suit::Clubs),
        ]);
        for cards in change_candidates(hand, 2) {
            assert_eq!(cards.count(), 2);
            assert!(!cards.contains(CardId::JOKER));
            assert!(!cards.contains(CardId::SPADE3));
            // the four sixes are a made revolution
            assert!(!cards.intersects(CardSet::rank_cards(Rank::SIX)));
        }
    }

    #[test]
    fn mate_in_hand_decides_without_search() {
        let engine = Engine::new(quiet_config());
        // pair of twos dominates, then the four finishes
        let mine = CardSet::from_cards(&[
            CardId::of(Rank::TWO, Suit::Clubs),
            CardId::of(Rank::TWO, Suit::Diamonds),
            CardId::of(Rank::FOUR, Suit::Clubs),
        ]);
        let mut record = PublicRecord::opening(0, mine, [3, 12, 13, 13, 13]);
        record.used = CardSet::single(CardId::JOKER);
        let m = engine.decide_play(&record);
        // the pair clears more cards than a lone two and is part of a mate
        assert_eq!(m.rank(), Rank::TWO);
        assert_eq!(m.qty(), 2);
    }
}
