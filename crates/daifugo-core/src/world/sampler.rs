//! Rejection sampling of hidden hands consistent with the public record.

use core::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::card::CardId;
use crate::model::cardset::CardSet;
use crate::model::field::N_PLAYERS;
use crate::world::record::PublicRecord;

/// One concrete assignment of every hidden card to a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct World {
    pub hands: [CardSet; N_PLAYERS],
}

impl World {
    pub fn hand(&self, seat: usize) -> CardSet {
        self.hands[seat]
    }
}

/// Errors that can arise while dealing a world from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// Hand sizes do not add up to the number of unseen cards.
    InconsistentCounts { unseen: u32, wanted: u32 },
    /// No deal satisfying the impossibility masks was found within the
    /// attempt budget.
    Exhausted { attempts: u32 },
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::InconsistentCounts { unseen, wanted } => {
                write!(f, "{unseen} unseen cards cannot fill {wanted} hand slots")
            }
            SampleError::Exhausted { attempts } => {
                write!(f, "no consistent deal found in {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for SampleError {}

/// Deals unseen cards uniformly over the assignments the record permits.
/// Each seat draws from its own `possible` set, most constrained seat
/// first; a draw that strands a later seat is rejected and retried.
#[derive(Debug, Default)]
pub struct RandomDealer {
    /// Draw attempts before giving up on a record.
    pub max_attempts: u32,
}

impl RandomDealer {
    pub const DEFAULT_ATTEMPTS: u32 = 64;

    pub fn new() -> RandomDealer {
        RandomDealer {
            max_attempts: Self::DEFAULT_ATTEMPTS,
        }
    }

    pub fn deal<R: Rng + ?Sized>(
        &self,
        record: &PublicRecord,
        rng: &mut R,
    ) -> Result<World, SampleError> {
        let unseen = record.unseen();
        let wanted: u32 = (0..N_PLAYERS)
            .filter(|p| *p != record.my_seat)
            .map(|p| u32::from(record.hand_sizes[p]))
            .sum();
        if unseen.count() != wanted {
            return Err(SampleError::InconsistentCounts {
                unseen: unseen.count(),
                wanted,
            });
        }

        let mut order: Vec<usize> = (0..N_PLAYERS)
            .filter(|p| *p != record.my_seat && record.hand_sizes[*p] > 0)
            .collect();
        order.sort_by_key(|p| record.possible(*p).count());

        let attempts = self.max_attempts.max(1);
        for _ in 0..attempts {
            if let Some(world) = draw(record, &order, rng) {
                return Ok(world);
            }
        }
        Err(SampleError::Exhausted { attempts })
    }
}

fn draw<R: Rng + ?Sized>(record: &PublicRecord, order: &[usize], rng: &mut R) -> Option<World> {
    let mut hands = [CardSet::EMPTY; N_PLAYERS];
    hands[record.my_seat] = record.my_cards;
    let mut taken = CardSet::EMPTY;
    for &p in order {
        let need = record.hand_sizes[p] as usize;
        let pool: Vec<CardId> = (record.possible(p) & !taken).iter().collect();
        if pool.len() < need {
            return None;
        }
        for &card in pool.choose_multiple(rng, need) {
            hands[p].insert(card);
            taken.insert(card);
        }
    }
    // hand sizes sum to the unseen count, so full quotas cover every card
    Some(World { hands })
}
