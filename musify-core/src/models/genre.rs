//! Genre tags used for browsing the open-content catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Genre tags supported by the browse screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum GenreType {
    Pop,
    Rock,
    Jazz,
    Electro,
    Ambient,
    Chill,
    Classical,
    Dance,
    Metal,
    RainyDay,
    Piano,
    Sleep,
    Energetic,
    Guitar,
    ElectricGuitar,
    Sad,
    Synthesizer,
    Funk,
}

impl GenreType {
    /// Returns the catalog tag used in queries.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Pop => "pop",
            Self::Rock => "rock",
            Self::Jazz => "jazz",
            Self::Electro => "electro",
            Self::Ambient => "ambient",
            Self::Chill => "chill",
            Self::Classical => "classical",
            Self::Dance => "dance",
            Self::Metal => "metal",
            Self::RainyDay => "rainy_day",
            Self::Piano => "piano",
            Self::Sleep => "sleep",
            Self::Energetic => "energetic",
            Self::Guitar => "guitar",
            Self::ElectricGuitar => "electric_guitar",
            Self::Sad => "sad",
            Self::Synthesizer => "synthesizer",
            Self::Funk => "funk",
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pop => "Pop",
            Self::Rock => "Rock",
            Self::Jazz => "Jazz",
            Self::Electro => "Electro",
            Self::Ambient => "Ambient",
            Self::Chill => "Chill",
            Self::Classical => "Classical",
            Self::Dance => "Dance",
            Self::Metal => "Metal",
            Self::RainyDay => "Rainy Day",
            Self::Piano => "Piano",
            Self::Sleep => "Sleep",
            Self::Energetic => "Energetic",
            Self::Guitar => "Guitar",
            Self::ElectricGuitar => "Electric Guitar",
            Self::Sad => "Sad",
            Self::Synthesizer => "Synthesizer",
            Self::Funk => "Funk",
        }
    }

    /// Returns all genres in display order.
    pub fn all() -> &'static [GenreType] {
        &[
            Self::Pop,
            Self::Rock,
            Self::Jazz,
            Self::Electro,
            Self::Ambient,
            Self::Chill,
            Self::Classical,
            Self::Dance,
            Self::Metal,
            Self::RainyDay,
            Self::Piano,
            Self::Sleep,
            Self::Energetic,
            Self::Guitar,
            Self::ElectricGuitar,
            Self::Sad,
            Self::Synthesizer,
            Self::Funk,
        ]
    }
}

impl fmt::Display for GenreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GenreType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::all()
            .iter()
            .copied()
            .find(|genre| genre.tag() == needle)
            .ok_or_else(|| CoreError::UnknownGenre(s.to_string()))
    }
}
