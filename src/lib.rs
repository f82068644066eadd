//! Parser for DUML, a line-oriented configuration format built from dotted
//! keys.
//!
//! ```
//! use duml::{ParseOptions, parse_str};
//!
//! let result = parse_str("pets.dog Rex\npets.dog Fido\n", ParseOptions::default()).unwrap();
//! assert_eq!(result.duml.get("pets.dog").and_then(|n| n.last()), Some("Fido"));
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod scan;

pub use error::{DumlError, Result};
pub use model::lost::LostNode;
pub use model::node::{Node, NodeMap};
pub use parser::{ParseOptions, ParseResult, parse_file, parse_reader, parse_str};
pub use render::render;
