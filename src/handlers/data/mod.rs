// handlers/data/mod.rs - game data endpoints
//
// Catalog tables go through the generic handlers in `resource`; characters and
// profession levels have their own composition logic.

pub mod characters;
pub mod profession_levels;
pub mod resource;
pub mod users;

pub use resource::{Bestiary, Characters, Classes, Dungeons, Equipment, Professions, Resources};
