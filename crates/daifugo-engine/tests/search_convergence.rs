//! End-to-end search behavior on constructed positions.

use daifugo_core::model::card::{CardId, Rank, Suit};
use daifugo_core::model::cardset::CardSet;
use daifugo_core::world::record::PublicRecord;
use daifugo_engine::{Engine, SearchConfig};

fn record_with(mine: CardSet, ops: &[CardId], sizes: [u8; 5]) -> PublicRecord {
    let ops_set = CardSet::from_cards(ops);
    let mut record = PublicRecord::opening(0, mine, sizes);
    record.used = CardSet::ALL & !mine & !ops_set;
    record
}

#[test]
fn search_finds_the_winning_lead() {
    tracing_subscriber::fmt()
        .with_env_filter("daifugo_engine=debug")
        .try_init()
        .ok();

    // Leading the two keeps the lead and finishes next turn; leading the
    // four hands some one-card opponent the game.
    let mine = CardSet::from_cards(&[
        CardId::of(Rank::TWO, Suit::Clubs),
        CardId::of(Rank::FOUR, Suit::Clubs),
    ]);
    let ops = [
        CardId::of(Rank::NINE, Suit::Clubs),
        CardId::of(Rank::TEN, Suit::Clubs),
        CardId::of(Rank::JACK, Suit::Clubs),
        CardId::of(Rank::QUEEN, Suit::Clubs),
    ];
    let record = record_with(mine, &ops, [2, 1, 1, 1, 1]);

    // force the bandit to do the work
    let engine = Engine::new(SearchConfig {
        threads: 2,
        use_mate_search: false,
        use_stopping: false,
        seed: Some(11),
        ..SearchConfig::default()
    });
    let m = engine.decide_play(&record);
    assert_eq!(m.rank(), Rank::TWO, "search picked {m}");
}

#[test]
fn exchange_search_completes() {
    let mine = CardSet::from_cards(&[
        CardId::of(Rank::FOUR, Suit::Clubs),
        CardId::of(Rank::FIVE, Suit::Diamonds),
        CardId::of(Rank::SEVEN, Suit::Clubs),
        CardId::of(Rank::TEN, Suit::Hearts),
        CardId::of(Rank::KING, Suit::Clubs),
        CardId::of(Rank::TWO, Suit::Spades),
    ]);
    let ops = [
        CardId::of(Rank::SIX, Suit::Clubs),
        CardId::of(Rank::SIX, Suit::Hearts),
        CardId::of(Rank::NINE, Suit::Clubs),
        CardId::of(Rank::JACK, Suit::Clubs),
        CardId::of(Rank::QUEEN, Suit::Clubs),
        CardId::of(Rank::QUEEN, Suit::Hearts),
        CardId::of(Rank::ACE, Suit::Clubs),
        CardId::of(Rank::ACE, Suit::Hearts),
    ];
    let record = record_with(mine, &ops, [6, 2, 2, 2, 2]);
    let engine = Engine::new(SearchConfig {
        threads: 2,
        use_mate_search: false,
        use_stopping: false,
        // keep the integration test quick
        max_change_simulations: 300,
        simulations_per_candidate: 40.0,
        seed: Some(5),
        ..SearchConfig::default()
    });
    let given = engine.decide_change(&record, 1, 2);
    assert_eq!(given.count(), 2);
    assert!(record.my_cards.contains_all(given));
}
