//! Persistent user state. The only thing worth keeping between runs is
//! the theme choice, stored as a single word in the data directory.

mod theme;

pub use theme::{load_theme, save_theme, Theme};
