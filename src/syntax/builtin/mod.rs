//! Built-in language definitions

mod go;

pub use go::{go_keywords, go_language, BLOCK_COMMENT, DISABLED_CODE, RAW_STRING};
