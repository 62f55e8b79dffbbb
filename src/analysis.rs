//! Text analysis for the in-memory matcher.
//!
//! Field values and query strings go through the same [`Tokenizer`] so that
//! index terms and query terms are directly comparable.

pub mod token;
pub mod tokenizer;

pub use self::token::{Token, TokenStream};
pub use self::tokenizer::{Tokenizer, UnicodeWordTokenizer};
