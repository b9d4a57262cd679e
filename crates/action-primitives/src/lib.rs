//! Page-level browser automation primitives.
//!
//! This crate is the boundary between game logic and the browser:
//! - [`Locator`]s describe elements by CSS, XPath or visible text, optionally nested
//! - [`PageDriver`] is the page handle the game layer consumes
//! - [`DefaultActionPrimitives`] implements it over the CDP adapter with auto-waiting

pub mod errors;
mod locator;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use primitives::*;
pub use types::*;
