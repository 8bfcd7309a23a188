//! The fixed index space shared by characters, markers and popups

use crate::error::{Result, VitrineError};
use std::fmt;

/// One of the three character positions in the showcase.
///
/// Characters, their markers and the popup panels are all keyed by slot, so
/// a marker can never point at a character index that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharacterSlot {
    /// Sleeping character, opens the skills panel
    Sleeping,
    /// Typing character, opens the developer intro
    Typing,
    /// Table-banging character, opens the project gallery
    Banging,
}

impl CharacterSlot {
    pub const ALL: [CharacterSlot; 3] = [Self::Sleeping, Self::Typing, Self::Banging];

    pub fn index(self) -> usize {
        match self {
            Self::Sleeping => 0,
            Self::Typing => 1,
            Self::Banging => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(VitrineError::InvalidSlot(index))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sleeping => "sleeping",
            Self::Typing => "typing",
            Self::Banging => "banging",
        }
    }
}

impl fmt::Display for CharacterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrips_for_every_slot() {
        for slot in CharacterSlot::ALL {
            assert_eq!(CharacterSlot::from_index(slot.index()).unwrap(), slot);
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(matches!(
            CharacterSlot::from_index(3),
            Err(VitrineError::InvalidSlot(3))
        ));
    }
}
