//! Adapters over the raw endpoint methods

mod evidence;

pub use evidence::submit_evidence;
