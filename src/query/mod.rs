pub mod composer;

pub use composer::{compose, ComposedQuery, SearchTerms};
