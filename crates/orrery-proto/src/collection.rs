//! Collection naming scheme.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

/// A top-level collection in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// `users`
    Users,
    /// `learning_modules`
    LearningModules,
    /// `levels`
    Levels,
    /// `planet_levels`
    PlanetLevels,
    /// `questions`
    Questions,
    /// `achievements`
    Achievements,
    /// `avatars`
    Avatars,
}

impl Collection {
    /// Every collection, users first.
    pub const ALL: [Self; 7] = [
        Self::Users,
        Self::LearningModules,
        Self::Levels,
        Self::PlanetLevels,
        Self::Questions,
        Self::Achievements,
        Self::Avatars,
    ];

    /// Collection name as used in document paths.
    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::LearningModules => "learning_modules",
            Self::Levels => "levels",
            Self::PlanetLevels => "planet_levels",
            Self::Questions => "questions",
            Self::Achievements => "achievements",
            Self::Avatars => "avatars",
        }
    }

    /// Parse a collection name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Address of a single document: `{collection}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPath {
    /// Owning collection.
    pub collection: Collection,
    /// Document key.
    pub id: String,
}

impl DocumentPath {
    /// Build a path.
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self { collection, id: id.into() }
    }

    /// Path of a user account document.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::new(Collection::Users, user_id)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A record stored as a document in a fixed collection.
pub trait Record: Serialize + DeserializeOwned {
    /// Collection holding records of this type.
    const COLLECTION: Collection;

    /// Document key.
    fn id(&self) -> &str;

    /// Full document path.
    fn path(&self) -> DocumentPath {
        DocumentPath::new(Self::COLLECTION, self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_name(collection.name()), Some(collection));
        }
        assert_eq!(Collection::from_name("planets"), None);
    }

    #[test]
    fn path_display() {
        let path = DocumentPath::user("abc123");
        assert_eq!(path.to_string(), "users/abc123");

        let path = DocumentPath::new(Collection::PlanetLevels, "level_mars");
        assert_eq!(path.to_string(), "planet_levels/level_mars");
    }
}
