//! Imperfect-information bookkeeping and world sampling.

pub mod record;
pub mod sampler;

pub use record::PublicRecord;
pub use sampler::{RandomDealer, SampleError, World};
