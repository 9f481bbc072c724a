pub mod parser;

pub use parser::{ParsedPois, parse_pois, parse_settlements, parse_streets, preferred_name};
