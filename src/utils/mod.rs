pub mod error;
pub mod logging;
pub mod normalization;
pub mod string_utils;

pub use error::*;
pub use normalization::{clean_string, normalize_string, remove_accents};
pub use string_utils::{fit_cell, truncate_chars};
