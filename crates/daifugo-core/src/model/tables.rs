//! Derived per-rank encodings of a card set.
//!
//! All of these live in the same 64-bit space as the card layout, four bits
//! per rank, joker excluded:
//!
//! - QR: each rank's nibble holds the card count at that rank.
//! - PQR: a count of k at a rank sets only bit k-1 of its nibble (one-hot).
//! - SC: a count of k sets the low k bits of the nibble.
//! - ND: per turn order, the set of (rank, quantity) requirement positions
//!   the hand can still answer; anything outside it is dominated. Joker
//!   presence shifts the whole encoding by one quantity step.
//!
//! The ND lookup table is process-initialized immutable state.

use once_cell::sync::Lazy;

use crate::model::cardset::CardSet;

const IMG_PLAIN: u64 = CardSet::IMG_PLAIN_ALL.bits();

pub const PQR_1: u64 = IMG_PLAIN & 0x1111_1111_1111_1111;
pub const PQR_2: u64 = IMG_PLAIN & 0x2222_2222_2222_2222;
pub const PQR_3: u64 = IMG_PLAIN & 0x4444_4444_4444_4444;
pub const PQR_4: u64 = IMG_PLAIN & 0x8888_8888_8888_8888;
pub const PQR_12: u64 = IMG_PLAIN & 0x3333_3333_3333_3333;
pub const PQR_13: u64 = IMG_PLAIN & 0x5555_5555_5555_5555;
pub const PQR_123: u64 = IMG_PLAIN & 0x7777_7777_7777_7777;
pub const PQR_234: u64 = IMG_PLAIN & 0xEEEE_EEEE_EEEE_EEEE;
pub const PQR_34: u64 = IMG_PLAIN & 0xCCCC_CCCC_CCCC_CCCC;
pub const PQR_1234: u64 = IMG_PLAIN;

/// The one-hot position of quantity `q` at every rank.
pub const fn qty_to_pqr(q: u32) -> u64 {
    PQR_1 << (q - 1)
}

/// Per-rank card counts, one nibble each.
pub fn cards_to_qr(plain: u64) -> u64 {
    let a = (plain & PQR_13) + ((plain >> 1) & PQR_13);
    (a & PQR_12) + ((a >> 2) & PQR_12)
}

/// QR -> PQR in a handful of parallel steps.
pub fn qr_to_pqr(qr: u64) -> u64 {
    let iqr = !qr;
    let qr_l1 = qr << 1;
    (PQR_1 & qr & (iqr >> 1)) | (PQR_2 & qr & (iqr << 1)) | ((qr & qr_l1) << 1) | (qr_l1 & PQR_4)
}

/// PQR -> SC: fill the bits below each one-hot position.
pub fn pqr_to_sc(pqr: u64) -> u64 {
    let mut r = pqr;
    r |= (r & PQR_234) >> 1;
    r |= (r & PQR_34) >> 2;
    r
}

/// Ranks holding exactly four cards, flagged at the PQR_1 position.
pub fn cards_to_fr(plain: u64) -> u64 {
    let a = plain & (plain >> 1);
    a & (a >> 2) & PQR_1
}

/// Ranks holding exactly three cards.
pub fn cards_to_3r(plain: u64) -> u64 {
    let ab_cd = plain & (plain >> 1);
    let axb_cxd = plain ^ (plain >> 1);
    ((ab_cd & (axb_cxd >> 2)) | ((ab_cd >> 2) & axb_cxd)) & PQR_1
}

/// Ranks holding exactly two cards.
pub fn cards_to_2r(plain: u64) -> u64 {
    let qr = cards_to_qr(plain);
    (qr >> 1) & !qr & PQR_1
}

/// Ranks holding at least one card.
pub fn cards_to_er(plain: u64) -> u64 {
    let a = plain | (plain >> 1);
    (a | (a >> 2)) & PQR_1
}

/// Ranks from which a plain group of `q` cards can be formed, flagged at the
/// PQR_1 position.
pub fn plain_group_cards(plain: u64, q: u8) -> u64 {
    match q {
        0 => CardSet::ALL.bits(),
        1 => plain & CardSet::PLAIN_ALL.bits(),
        2 => cards_to_qr(plain) & PQR_234,
        3 => (cards_to_qr(plain) + PQR_1) & PQR_34,
        4 => cards_to_fr(plain),
        _ => 0,
    }
}

/// Group formability with the joker allowed to fill one slot.
pub fn group_cards(cards: CardSet, q: u8) -> u64 {
    let need = if cards.has_joker() { q - 1 } else { q };
    plain_group_cards(cards.plain().bits(), need)
}

/// Non-domination lookup: `[order][rank][quantity - 1]`, quantities above
/// four clamped to the four-card column.
pub static ND_TABLE: Lazy<[[[u64; 8]; 16]; 2]> = Lazy::new(|| {
    let mut table = [[[0u64; 8]; 16]; 2];
    let cum = [PQR_1, PQR_12, PQR_123, PQR_1234];
    for (r, row) in table[0].iter_mut().enumerate() {
        let below = CardSet::rank_range(0, r as u8).bits();
        for (q, cell) in row.iter_mut().enumerate() {
            *cell = below & cum[q.min(3)];
        }
    }
    for (r, row) in table[1].iter_mut().enumerate() {
        let above = CardSet::rank_range(r as u8, 14).bits();
        for (q, cell) in row.iter_mut().enumerate() {
            *cell = above & cum[q.min(3)];
        }
    }
    table
});

/// PQR -> the two non-domination tables; the joker count shifts both by one
/// quantity step and makes every single answerable.
pub fn pqr_to_nd(pqr: u64, jokers: u32) -> [u64; 2] {
    debug_assert!(jokers <= 1);
    let table = &*ND_TABLE;
    let mut nd = [0u64; 2];

    // A rank with q cards answers any requirement strictly below (or above,
    // reversed) of quantity <= q. Walk the shifted PQR from the wide end so
    // each table row absorbs everything it covers.
    let mut tmp0 = pqr >> 4;
    let mut tmp1 = pqr << 4;
    while tmp0 != 0 {
        let pos = 63 - tmp0.leading_zeros();
        nd[0] |= table[0][(pos >> 2) as usize][(pos & 3) as usize];
        tmp0 &= !nd[0];
    }
    while tmp1 != 0 {
        let pos = tmp1.trailing_zeros();
        nd[1] |= table[1][(pos >> 2) as usize][(pos & 3) as usize];
        tmp1 &= !nd[1];
    }

    if jokers != 0 {
        nd[0] <<= 1;
        nd[0] |= PQR_1;
        nd[1] &= PQR_123;
        nd[1] <<= 1;
        nd[1] |= PQR_1;
    }
    nd
}
