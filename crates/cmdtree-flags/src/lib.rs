//! Typed option declarations and argument parsing.
//!
//! This crate is the low-level half of `cmdtree`: it knows nothing about
//! commands. It is reused by:
//! - `cmdtree` (to build one `OptionSet` per invocation from the resolved command path)
//! - embedders that only need a flat flag parser
//!
//! An [`OptionSet`] holds named and positional slots, each with a typed
//! [`Value`]. [`OptionSet::parse`] scans tokens left to right:
//! - `--` stops scanning; everything after it is kept verbatim in [`OptionSet::rest`]
//! - `--name value`, `--name=value`, `-n value`
//! - booleans take an implicit `true` (or `false` for `--no-name`)
//! - plain tokens fill positional slots in declaration order

mod error;
mod set;
mod value;

pub use error::{DeclareError, ParseError};
pub use set::{Declaration, OptionSet, Slot, prefixed};
pub use value::{Kind, Value, parse_bool, parse_int};
