use std::fmt;
use std::str::FromStr;

use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1::Anchor;

use crate::AutohideError;
use crate::hotspot::HotspotEdge;

/// The output edge the panel is anchored to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    #[default]
    Top,
    Bottom,
}

impl Position {
    pub const TOP: &'static str = "top";
    pub const BOTTOM: &'static str = "bottom";

    /// Parse a configured value, falling back to [`Position::Top`] with a
    /// warning. A bad option must never keep the panel from showing.
    pub fn from_config(value: &str) -> Self {
        value.parse().unwrap_or_else(|err: AutohideError| {
            log::warn!("{err}, defaulting to top");
            Self::Top
        })
    }

    /// The layer-shell anchor edge of this position.
    pub fn anchor(self) -> Anchor {
        match self {
            Self::Top => Anchor::Top,
            Self::Bottom => Anchor::Bottom,
        }
    }

    pub fn hotspot_edge(self) -> HotspotEdge {
        match self {
            Self::Top => HotspotEdge::Top,
            Self::Bottom => HotspotEdge::Bottom,
        }
    }
}

impl FromStr for Position {
    type Err = AutohideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::TOP => Ok(Self::Top),
            Self::BOTTOM => Ok(Self::Bottom),
            other => Err(AutohideError::InvalidPosition(other.to_owned())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => Self::TOP,
            Self::Bottom => Self::BOTTOM,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_positions() {
        assert_eq!("top".parse::<Position>().unwrap(), Position::Top);
        assert_eq!("bottom".parse::<Position>().unwrap(), Position::Bottom);
        assert_eq!(Position::Bottom.to_string(), "bottom");
    }

    #[test]
    fn unknown_position_falls_back_to_top() {
        assert!("left".parse::<Position>().is_err());
        assert_eq!(Position::from_config("left"), Position::Top);
        assert_eq!(Position::from_config(""), Position::Top);
        assert_eq!(Position::from_config("Bottom"), Position::Top);
    }

    #[test]
    fn maps_to_single_anchor_edge() {
        assert_eq!(Position::Top.anchor(), Anchor::Top);
        assert_eq!(Position::Bottom.anchor(), Anchor::Bottom);
        assert_eq!(Position::Bottom.hotspot_edge(), HotspotEdge::Bottom);
    }
}
