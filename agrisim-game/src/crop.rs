//! Crop kinds the player can plant.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CropKind {
    #[default]
    Maize,
    Wheat,
    Rice,
    Soybean,
    Potato,
    Tomato,
    /// Anything the coefficient table does not know about.
    #[serde(other)]
    Other,
}

impl CropKind {
    pub const KNOWN: [Self; 6] = [
        Self::Maize,
        Self::Wheat,
        Self::Rice,
        Self::Soybean,
        Self::Potato,
        Self::Tomato,
    ];

    /// Lenient parse used by setup forms and the CLI.
    #[must_use]
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "maize" | "corn" => Self::Maize,
            "wheat" => Self::Wheat,
            "rice" => Self::Rice,
            "soybean" | "soy" | "soybeans" => Self::Soybean,
            "potato" | "potatoes" => Self::Potato,
            "tomato" | "tomatoes" => Self::Tomato,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Maize => "maize",
            Self::Wheat => "wheat",
            Self::Rice => "rice",
            Self::Soybean => "soybean",
            Self::Potato => "potato",
            Self::Tomato => "tomato",
            Self::Other => "other",
        }
    }

}

impl std::fmt::Display for CropKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_crops_deserialize_as_other() {
        let crop: CropKind = serde_json::from_str("\"quinoa\"").unwrap();
        assert_eq!(crop, CropKind::Other);
        assert_eq!(CropKind::parse_lossy(" Corn "), CropKind::Maize);
    }

    #[test]
    fn known_crops_parse_back_from_their_labels() {
        for crop in CropKind::KNOWN {
            assert_eq!(CropKind::parse_lossy(crop.label()), crop);
        }
    }
}
