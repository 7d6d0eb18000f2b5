//! Name codec
//!
//! Reversible obfuscation of file names so they survive as a URL segment.

mod name;

pub use name::{DEFAULT_NAME_PREFIX, DEFAULT_NAME_SEPARATOR, NameCodec};
