//! # sidx - Sphinx Search Index Query Tool
//!
//! sidx loads the `searchindex.js` artifact a Sphinx build drops next to
//! its HTML output and runs the same kind of search the site's embedded
//! widget does, from the terminal: stemmed term lookup, title matches,
//! partial matches, and the object inventory, ranked with the widget's
//! own weights.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Payload parsing, the in-memory index, validation, stats
//! - [`query`] - Query parsing, execution, and scoring
//! - [`output`] - Result formatting (terminal and JSON)
//! - [`utils`] - Word normalization and the stemmer the widget uses
//!
//! ## Quick Start
//!
//! ```ignore
//! use sidx::index::load_index;
//! use sidx::query::{parse_query, QueryExecutor};
//! use std::path::Path;
//!
//! let index = load_index(Path::new("_build/html/searchindex.js")).unwrap();
//!
//! let query = parse_query("connect gears");
//! let executor = QueryExecutor::new(&index);
//! let hits = executor.execute(&query).unwrap();
//!
//! for hit in hits {
//!     println!("{:>6.1}  {}", hit.score, hit.link);
//! }
//! ```

pub mod index;
pub mod output;
pub mod query;
pub mod utils;
