//! Page parsing.
//!
//! `GoRailsMarkup` is the default [`PageParser`]; a different site layout
//! only needs another implementation of the trait.

pub mod markup;

pub use markup::{GoRailsMarkup, PageParser};
