//! Simulation driver: selectors and full-deal playouts.

pub mod playout;
pub mod selector;

pub use playout::Playout;
pub use selector::Selector;
