//! Palette.
//!
//! Player colors are the 16 names the server hands out on join; everything
//! else the renderer paints uses the constants below.

use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA color, components in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `factor` (clamped to `[0, 1]`).
    pub fn with_alpha(self, factor: f64) -> Self {
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            a: (f64::from(self.a) * factor).round() as u8,
            ..self
        }
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const SNOW: Self = Self::rgb(236, 244, 252);
    pub const NIGHT: Self = Self::rgb(14, 22, 38);
    pub const ICE: Self = Self::rgb(208, 232, 248);
    pub const STONE: Self = Self::rgb(96, 104, 120);
    pub const GOLD: Self = Self::rgb(255, 214, 92);
    pub const TEAM_BLUE: Self = Self::rgb(64, 140, 255);
    pub const TEAM_RED: Self = Self::rgb(236, 72, 72);
}

/// One of the 16 player colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Lime,
    Green,
    Teal,
    Cyan,
    Blue,
    Indigo,
    Purple,
    Magenta,
    Pink,
    Brown,
    Gray,
    Black,
    White,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 16] = [
        PlayerColor::Red,
        PlayerColor::Orange,
        PlayerColor::Yellow,
        PlayerColor::Lime,
        PlayerColor::Green,
        PlayerColor::Teal,
        PlayerColor::Cyan,
        PlayerColor::Blue,
        PlayerColor::Indigo,
        PlayerColor::Purple,
        PlayerColor::Magenta,
        PlayerColor::Pink,
        PlayerColor::Brown,
        PlayerColor::Gray,
        PlayerColor::Black,
        PlayerColor::White,
    ];

    pub fn rgba(self) -> Rgba {
        match self {
            PlayerColor::Red => Rgba::rgb(229, 57, 53),
            PlayerColor::Orange => Rgba::rgb(251, 140, 0),
            PlayerColor::Yellow => Rgba::rgb(253, 216, 53),
            PlayerColor::Lime => Rgba::rgb(192, 202, 51),
            PlayerColor::Green => Rgba::rgb(67, 160, 71),
            PlayerColor::Teal => Rgba::rgb(0, 137, 123),
            PlayerColor::Cyan => Rgba::rgb(0, 172, 193),
            PlayerColor::Blue => Rgba::rgb(30, 136, 229),
            PlayerColor::Indigo => Rgba::rgb(57, 73, 171),
            PlayerColor::Purple => Rgba::rgb(142, 36, 170),
            PlayerColor::Magenta => Rgba::rgb(216, 27, 196),
            PlayerColor::Pink => Rgba::rgb(240, 98, 146),
            PlayerColor::Brown => Rgba::rgb(109, 76, 65),
            PlayerColor::Gray => Rgba::rgb(117, 117, 117),
            PlayerColor::Black => Rgba::rgb(33, 33, 33),
            PlayerColor::White => Rgba::rgb(250, 250, 250),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Orange => "orange",
            PlayerColor::Yellow => "yellow",
            PlayerColor::Lime => "lime",
            PlayerColor::Green => "green",
            PlayerColor::Teal => "teal",
            PlayerColor::Cyan => "cyan",
            PlayerColor::Blue => "blue",
            PlayerColor::Indigo => "indigo",
            PlayerColor::Purple => "purple",
            PlayerColor::Magenta => "magenta",
            PlayerColor::Pink => "pink",
            PlayerColor::Brown => "brown",
            PlayerColor::Gray => "gray",
            PlayerColor::Black => "black",
            PlayerColor::White => "white",
        }
    }
}

impl std::str::FromStr for PlayerColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerColor::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Ring color for a snowball-fight team.
pub fn team_color(team: u8) -> Rgba {
    if team == 0 {
        Rgba::TEAM_BLUE
    } else {
        Rgba::TEAM_RED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_color_decodes_lowercase() {
        let c: PlayerColor = serde_json::from_str("\"magenta\"").unwrap();
        assert_eq!(c, PlayerColor::Magenta);
        assert_eq!(c.as_str(), "magenta");
    }

    #[test]
    fn player_color_parses_leniently() {
        assert_eq!("Teal".parse::<PlayerColor>(), Ok(PlayerColor::Teal));
        assert!("".parse::<PlayerColor>().is_err());
        assert!("chartreuse".parse::<PlayerColor>().is_err());
    }

    #[test]
    fn palette_has_sixteen_distinct_colors() {
        let mut seen: Vec<Rgba> = PlayerColor::ALL.iter().map(|c| c.rgba()).collect();
        seen.sort_by_key(|c| (c.r, c.g, c.b));
        seen.dedup();
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn with_alpha_scales() {
        assert_eq!(Rgba::WHITE.with_alpha(0.5).a, 128);
        assert_eq!(Rgba::WHITE.with_alpha(2.0).a, 255);
        assert_eq!(Rgba::WHITE.with_alpha(f64::NAN).a, 0);
    }
}
