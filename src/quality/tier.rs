//! Air-quality severity tiers and their display metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete severity bucket for a pollutant concentration, in ascending order
/// of severity.
///
/// The derived `Ord` follows declaration order, so `Tier::Bueno < Tier::Peligroso`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Also shown as "Bajo" on the monitoring map.
    Bueno,
    Moderado,
    Regular,
    Alto,
    MuyAlto,
    Peligroso,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Bueno,
        Tier::Moderado,
        Tier::Regular,
        Tier::Alto,
        Tier::MuyAlto,
        Tier::Peligroso,
    ];

    /// Ordinal position, 0 for the least severe tier.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Bueno => "Bueno",
            Tier::Moderado => "Moderado",
            Tier::Regular => "Regular",
            Tier::Alto => "Alto",
            Tier::MuyAlto => "Muy Alto",
            Tier::Peligroso => "Peligroso",
        }
    }

    /// Colour name used for badges and legends.
    pub fn color_key(self) -> &'static str {
        match self {
            Tier::Bueno => "green",
            Tier::Moderado => "yellow",
            Tier::Regular => "orange",
            Tier::Alto => "red",
            Tier::MuyAlto => "purple",
            Tier::Peligroso => "maroon",
        }
    }

    /// Fill colour for map markers.
    pub fn hex_color(self) -> &'static str {
        match self {
            Tier::Bueno => "#16a34a",
            Tier::Moderado => "#e5fb1c",
            Tier::Regular => "#f9883c",
            Tier::Alto => "#dc2626",
            Tier::MuyAlto => "#9333ea",
            Tier::Peligroso => "#7e0023",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tier::Bueno => "Calidad del aire buena",
            Tier::Moderado => "Calidad del aire moderada",
            Tier::Regular => "Calidad del aire aceptable",
            Tier::Alto => "Calidad del aire no saludable",
            Tier::MuyAlto => "Calidad del aire muy poco saludable",
            Tier::Peligroso => "Calidad del aire peligrosa",
        }
    }

    /// Parses a status label as returned by the backend ("Muy Alto", "Bajo", ...).
    pub fn from_label(label: &str) -> Option<Tier> {
        match label.trim() {
            "Bueno" | "Bajo" => Some(Tier::Bueno),
            "Moderado" => Some(Tier::Moderado),
            "Regular" => Some(Tier::Regular),
            "Alto" => Some(Tier::Alto),
            "Muy Alto" | "MuyAlto" => Some(Tier::MuyAlto),
            "Peligroso" => Some(Tier::Peligroso),
            _ => None,
        }
    }

    /// Display metadata bundled for the rendering layer.
    pub fn info(self) -> TierInfo {
        TierInfo {
            tier: self,
            rank: self.rank(),
            label: self.label(),
            color: self.color_key(),
            hex_color: self.hex_color(),
            description: self.description(),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serializable view of a [`Tier`] with everything a map marker or table row needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierInfo {
    pub tier: Tier,
    pub rank: u8,
    pub label: &'static str,
    pub color: &'static str,
    pub hex_color: &'static str,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_follow_declaration_order() {
        for (i, tier) in Tier::ALL.iter().enumerate() {
            assert_eq!(tier.rank() as usize, i);
        }
        assert!(Tier::Bueno < Tier::Moderado);
        assert!(Tier::MuyAlto < Tier::Peligroso);
    }

    #[test]
    fn test_from_label_accepts_aliases() {
        assert_eq!(Tier::from_label("Bajo"), Some(Tier::Bueno));
        assert_eq!(Tier::from_label("Muy Alto"), Some(Tier::MuyAlto));
        assert_eq!(Tier::from_label(" Alto "), Some(Tier::Alto));
        assert_eq!(Tier::from_label("Desconocido"), None);
    }

    #[test]
    fn test_label_round_trips_through_from_label() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_label(tier.label()), Some(tier));
        }
    }

    #[test]
    fn test_info_carries_metadata() {
        let info = Tier::Alto.info();
        assert_eq!(info.rank, 3);
        assert_eq!(info.label, "Alto");
        assert_eq!(info.color, "red");
        assert_eq!(info.hex_color, "#dc2626");
    }
}
