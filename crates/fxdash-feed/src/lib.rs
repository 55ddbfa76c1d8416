//! News feed retrieval and RSS parsing.
//!
//! [`FeedClient`] downloads the raw RSS document (optionally through a CORS
//! relay) and [`parse_feed`] turns it into ordered [`fxdash_core::Article`]s.

pub mod client;
pub mod error;
pub mod parse;

pub use client::{relay_url, FeedClient};
pub use error::{FetchError, ParseError};
pub use parse::{parse_feed, strip_html};
