//! Lords & Knights bindings: fixed game tables, selectors and the board trait
//! the maintenance cycle is written against.

mod board;
pub mod constants;
mod page;
pub mod selectors;

pub use board::{GameBoard, ParsedBuilding};
pub use constants::{HabitatType, ResearchBuilding};
pub use page::LordsPage;
