//! Full table state for determinized playouts.

use serde::{Deserialize, Serialize};

use crate::model::board::Board;
use crate::model::card::CardId;
use crate::model::cardset::CardSet;
use crate::model::combo::Combo;
use crate::model::hand::HandIndex;

pub const N_PLAYERS: usize = 5;

/// Finishing classes, best to worst, one per seat.
pub type Classes = [Option<u8>; N_PLAYERS];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub hands: [HandIndex; N_PLAYERS],
    pub board: Board,
    pub turn: usize,
    /// Seat that owns the standing board (last non-pass player).
    pub owner: usize,
    pub alive: [bool; N_PLAYERS],
    pub awake: [bool; N_PLAYERS],
    pub classes: Classes,
    n_finished: u8,
}

impl Field {
    pub fn new(
        hands: [CardSet; N_PLAYERS],
        board: Board,
        turn: usize,
        owner: usize,
        alive: [bool; N_PLAYERS],
        awake: [bool; N_PLAYERS],
        classes: Classes,
    ) -> Field {
        let n_finished = classes.iter().filter(|c| c.is_some()).count() as u8;
        Field {
            hands: hands.map(HandIndex::new),
            board,
            turn,
            owner,
            alive,
            awake,
            classes,
            n_finished,
        }
    }

    /// Fresh deal: the holder of the 3 of diamonds leads.
    pub fn from_deal(hands: [CardSet; N_PLAYERS]) -> Field {
        let lead = hands
            .iter()
            .position(|h| h.contains(CardId::DIAMOND3))
            .unwrap_or(0);
        Field::new(
            hands,
            Board::null(),
            lead,
            lead,
            [true; N_PLAYERS],
            [true; N_PLAYERS],
            [None; N_PLAYERS],
        )
    }

    pub fn n_alive(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    pub fn is_over(&self) -> bool {
        self.n_alive() <= 1
    }

    pub fn hand(&self, seat: usize) -> &HandIndex {
        &self.hands[seat]
    }

    /// Union of every live opponent's cards, for collective domination
    /// checks.
    pub fn opponents_of(&self, seat: usize) -> CardSet {
        let mut set = CardSet::EMPTY;
        for (p, hand) in self.hands.iter().enumerate() {
            if p != seat && self.alive[p] {
                set |= hand.cards;
            }
        }
        set
    }

    /// Pre-round exchange: move `cards` between two seats.
    pub fn commit_exchange(&mut self, from: usize, to: usize, cards: CardSet) {
        debug_assert!(self.hands[from].cards.contains_all(cards));
        self.hands[from].remove_cards(cards);
        self.hands[to].add_cards(cards);
    }

    fn finish(&mut self, seat: usize) {
        self.classes[seat] = Some(self.n_finished);
        self.n_finished += 1;
        self.alive[seat] = false;
        self.awake[seat] = false;
    }

    fn flush(&mut self) {
        self.board.clear();
        self.awake = self.alive;
    }

    fn next_alive_after(&self, seat: usize) -> usize {
        for step in 1..=N_PLAYERS {
            let p = (seat + step) % N_PLAYERS;
            if self.alive[p] {
                return p;
            }
        }
        seat
    }

    fn next_awake_after(&self, seat: usize) -> Option<usize> {
        for step in 1..=N_PLAYERS {
            let p = (seat + step) % N_PLAYERS;
            if self.awake[p] {
                return Some(p);
            }
        }
        None
    }

    /// Advance the table by one action of the seat on turn. Returns the next
    /// seat to act, or `None` once the ranking is complete (the last live
    /// seat receives the worst class).
    pub fn proc(&mut self, seat: usize, m: &Combo) -> Option<usize> {
        debug_assert_eq!(seat, self.turn);
        let mut cleared = false;
        if m.is_pass() {
            self.awake[seat] = false;
        } else {
            self.hands[seat].reduce(m);
            self.board.apply(m);
            self.owner = seat;
            cleared = self.board.is_null();
            if self.hands[seat].is_empty() {
                self.finish(seat);
            }
        }

        if self.is_over() {
            for p in 0..N_PLAYERS {
                if self.alive[p] {
                    self.classes[p] = Some(self.n_finished);
                }
            }
            return None;
        }

        let next = if cleared {
            self.flush();
            if self.alive[seat] {
                seat
            } else {
                self.next_alive_after(seat)
            }
        } else {
            match self.next_awake_after(seat) {
                Some(p) if p != self.owner => p,
                _ => {
                    // trick closed: everyone else passed or is gone
                    self.flush();
                    if self.alive[self.owner] {
                        self.owner
                    } else {
                        self.next_alive_after(self.owner)
                    }
                }
            }
        };
        self.turn = next;
        Some(next)
    }
}
