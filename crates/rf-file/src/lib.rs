//! rf-file: Roster and Winners File I/O
//!
//! Provides:
//! - Roster import from pasted text or name files (one name per line,
//!   first column of CSV/TSV exports)
//! - Winners export to CSV and JSON (`Draw Order`, `Winner Name`)

mod error;
pub mod export;
pub mod roster;

pub use error::*;
pub use export::*;
pub use roster::*;
