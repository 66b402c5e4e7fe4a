pub mod character;
pub mod class;
pub mod profession;
pub mod user;

pub use character::{Character, CharacterProfession, CharacterProfile, NewCharacter};
pub use class::{ClassChanges, NewClass};
pub use profession::{LevelChange, NewProfessionLevel, Profession, ProfessionChanges, ProfessionLevel};
pub use user::{NewUser, User, UserSummary};

/// Table names in the hosted schema
pub mod tables {
    pub const USERS: &str = "users";
    pub const CLASSES: &str = "clases";
    pub const CHARACTERS: &str = "personajes";
    pub const PROFESSIONS: &str = "oficios";
    pub const PROFESSION_LEVELS: &str = "oficioslevel";
    pub const DUNGEONS: &str = "mazmorras";
    pub const EQUIPMENT: &str = "equipamiento";
    pub const RESOURCES: &str = "recursos";
    pub const BESTIARY: &str = "bestiario";
}
