//! Feed Layer
//!
//! Turns a raw HAProxy statistics dump (`show stat` CSV) into a typed,
//! schema-inferred intermediate representation before anything touches SQL.
//!
//! # Components
//!
//! - [`StatsFeed`]: Parsed feed (ordered column names + typed rows)
//! - [`ColumnName`]: Sanitized identifier derived from the header line
//! - [`Cell`]: Positionally typed value (null, integer, float, text)
//! - [`FeedError`]: Parse failures (invalid feed, no data, illegal column)
//!
//! # Example
//!
//! ```
//! use haproxy_check::feed::{Cell, StatsFeed};
//!
//! let feed = StatsFeed::parse(b"# pxname,svname,act,type,-\nweb,s1,1,0,\n").unwrap();
//! assert_eq!(feed.columns().len(), 5);
//! assert_eq!(feed.rows()[0][2], Cell::Integer(1));
//! ```

mod cell;
mod column;
mod error;
mod parser;

pub use cell::Cell;
pub use column::{ColumnName, DASH_PLACEHOLDER};
pub use error::FeedError;
pub use parser::StatsFeed;
