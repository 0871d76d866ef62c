//! Speech synthesis engines.
//!
//! # Available Engines
//!
//! - `concat` - concatenative synthesis from recorded phoneme clips

pub mod concat;
