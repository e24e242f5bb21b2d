//! Value parser module for the marker micro-language

pub mod value_parser;

pub use value_parser::*;
