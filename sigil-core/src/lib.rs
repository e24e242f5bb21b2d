//! Sigil Core - Marker Data Types
//!
//! Pure data structures with no parsing behavior. The `sigil-dsl` crate
//! depends on this for positions, target levels, parsed values, and the
//! error taxonomy; host-language collaborators depend on it to consume
//! parse results without pulling in the parser.

pub mod error;
pub mod position;
pub mod target;
pub mod value;
pub mod values;

pub use error::{
    ErrorList, ParseError, ParseErrorKind, RegistrationError, SchemaError, SigilError, SigilResult,
};
pub use position::Position;
pub use target::TargetLevel;
pub use value::Value;
pub use values::{MarkerInstance, Values};
