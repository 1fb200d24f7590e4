//! Retrograde solver and database tools for Le Grec.

pub mod checkpoint;
pub mod config;
pub mod solver;
pub mod stats;
