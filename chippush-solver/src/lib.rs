//! Chip-pushing solver internals.
//!
//! The binaries are thin wrappers: `chippush-solver` runs the minimax
//! search of [`solver`], `verify` re-plays archived boards one ply deep.
//! Everything else lives here so both binaries (and the tests) share it.

pub mod archive;
pub mod config;
pub mod movegen;
pub mod solver;
pub mod stats;
