//! Decisions that must bypass Monte-Carlo search entirely.

use daifugo_core::model::card::{CardId, Rank, Suit};
use daifugo_core::model::cardset::CardSet;
use daifugo_core::model::combo::Combo;
use daifugo_core::world::record::PublicRecord;
use daifugo_engine::{Engine, SearchConfig};

fn engine() -> Engine {
    Engine::new(SearchConfig {
        threads: 1,
        seed: Some(3),
        ..SearchConfig::default()
    })
}

/// Record where the opponents collectively hold exactly `ops`.
fn record_with(mine: CardSet, ops: &[CardId], sizes: [u8; 5]) -> PublicRecord {
    let ops_set = CardSet::from_cards(ops);
    let mut record = PublicRecord::opening(0, mine, sizes);
    record.used = CardSet::ALL & !mine & !ops_set;
    record
}

#[test]
fn triple_is_preferred_over_smaller_mates() {
    let mine = CardSet::from_cards(&[
        CardId::of(Rank::THREE, Suit::Clubs),
        CardId::of(Rank::THREE, Suit::Diamonds),
        CardId::of(Rank::THREE, Suit::Hearts),
        CardId::of(Rank::FOUR, Suit::Clubs),
    ]);
    // lone middling singles: no reply to any triple exists
    let ops = [
        CardId::of(Rank::FIVE, Suit::Clubs),
        CardId::of(Rank::SIX, Suit::Clubs),
        CardId::of(Rank::SEVEN, Suit::Clubs),
        CardId::of(Rank::NINE, Suit::Clubs),
    ];
    let record = record_with(mine, &ops, [4, 1, 1, 1, 1]);
    let m = engine().decide_play(&record);
    assert_eq!(m.rank(), Rank::THREE);
    assert_eq!(m.qty(), 3);
}

#[test]
fn eight_cut_line_is_found() {
    let mine = CardSet::from_cards(&[
        CardId::of(Rank::EIGHT, Suit::Clubs),
        CardId::of(Rank::FOUR, Suit::Clubs),
    ]);
    // opponents can beat the four, so only the eight-first line wins
    let ops = [
        CardId::of(Rank::KING, Suit::Clubs),
        CardId::of(Rank::ACE, Suit::Clubs),
        CardId::of(Rank::TEN, Suit::Hearts),
        CardId::of(Rank::JACK, Suit::Hearts),
    ];
    let record = record_with(mine, &ops, [2, 1, 1, 1, 1]);
    let m = engine().decide_play(&record);
    assert_eq!(m.rank(), Rank::EIGHT);
}

#[test]
fn finishing_move_beats_every_other_line() {
    let mine = CardSet::from_cards(&[
        CardId::of(Rank::TWO, Suit::Clubs),
        CardId::of(Rank::TWO, Suit::Diamonds),
    ]);
    let ops = [
        CardId::of(Rank::FIVE, Suit::Clubs),
        CardId::of(Rank::SIX, Suit::Clubs),
        CardId::of(Rank::SEVEN, Suit::Clubs),
        CardId::of(Rank::NINE, Suit::Clubs),
    ];
    let record = record_with(mine, &ops, [2, 1, 1, 1, 1]);
    let m = engine().decide_play(&record);
    // the pair finishes immediately; a lone two would merely dominate
    assert_eq!(m.qty(), 2);
    assert_eq!(m.rank(), Rank::TWO);
}

#[test]
fn two_player_endgame_is_decided_without_playouts() {
    // a zero simulation budget leaves the mate analysis as the only way
    // to pick the winning reply
    let engine = Engine::new(SearchConfig {
        threads: 1,
        seed: Some(3),
        max_play_simulations: 0,
        simulations_per_candidate: 0.0,
        ..SearchConfig::default()
    });
    let mine = CardSet::from_cards(&[
        CardId::of(Rank::TWO, Suit::Clubs),
        CardId::of(Rank::THREE, Suit::Clubs),
    ]);
    let ops = [
        CardId::of(Rank::KING, Suit::Clubs),
        CardId::of(Rank::ACE, Suit::Clubs),
        CardId::of(Rank::NINE, Suit::Hearts),
    ];
    let mut record = record_with(mine, &ops, [2, 3, 0, 0, 0]);
    record.board.apply(&Combo::single(CardId::of(Rank::FIVE, Suit::Hearts)));
    let m = engine.decide_play(&record);
    // the two holds the lead, then the three finishes unopposed
    assert_eq!(m.rank(), Rank::TWO);
    assert_eq!(m.qty(), 1);
}
