use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::common::geometry::Rect;
use crate::model::{ParentKind, TilingContainerData};

/// Stored layout of a tiling container.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Layout {
    #[default]
    Tile,
    Monocle,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Orientation {
    #[default]
    #[serde(rename = "h")]
    #[strum(serialize = "h")]
    H,
    #[serde(rename = "v")]
    #[strum(serialize = "v")]
    V,
}

impl Orientation {
    /// Wide (or square) screens tile horizontally, tall ones vertically.
    pub fn for_rect(rect: Rect) -> Orientation {
        if rect.is_landscape() { Orientation::H } else { Orientation::V }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Step through the stack: left and up go towards the master.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left | Direction::Up => -1,
            Direction::Right | Direction::Down => 1,
        }
    }
}

/// Layout token accepted by the layout toggle command.
///
/// The accordion and tiles families are aliases of [`Layout::Tile`]; they
/// are never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutDescription {
    #[serde(rename = "h_accordion")]
    #[strum(serialize = "h_accordion")]
    HAccordion,
    #[serde(rename = "v_accordion")]
    #[strum(serialize = "v_accordion")]
    VAccordion,
    #[serde(rename = "h_tiles")]
    #[strum(serialize = "h_tiles")]
    HTiles,
    #[serde(rename = "v_tiles")]
    #[strum(serialize = "v_tiles")]
    VTiles,
    Accordion,
    Tiles,
    Tile,
    Monocle,
    Horizontal,
    Vertical,
    Tiling,
    Floating,
}

/// Where a window currently sits, as far as layout tokens care.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub root: Option<TilingContainerData>,
    pub parent: Option<ParentKind>,
}

/// What applying a layout token changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutChange {
    Tiling {
        layout: Option<Layout>,
        orientation: Option<Orientation>,
    },
    MakeTiling,
    MakeFloating,
}

impl LayoutDescription {
    pub fn matches(self, placement: &Placement) -> bool {
        use LayoutDescription::*;
        let root = placement.root.as_ref();
        let tile_oriented = |o: Orientation| {
            root.is_some_and(|r| r.layout == Layout::Tile && r.orientation == o)
        };
        match self {
            Accordion | Tiles | Tile => root.is_some_and(|r| r.layout == Layout::Tile),
            Monocle => root.is_some_and(|r| r.layout == Layout::Monocle),
            Horizontal => root.is_some_and(|r| r.orientation == Orientation::H),
            Vertical => root.is_some_and(|r| r.orientation == Orientation::V),
            HAccordion | HTiles => tile_oriented(Orientation::H),
            VAccordion | VTiles => tile_oriented(Orientation::V),
            Tiling => placement.parent == Some(ParentKind::TilingContainer),
            Floating => placement.parent == Some(ParentKind::Workspace),
        }
    }

    pub fn change(self) -> LayoutChange {
        use LayoutDescription::*;
        let tiling = |layout, orientation| LayoutChange::Tiling { layout, orientation };
        match self {
            HAccordion | HTiles => tiling(Some(Layout::Tile), Some(Orientation::H)),
            VAccordion | VTiles => tiling(Some(Layout::Tile), Some(Orientation::V)),
            Accordion | Tiles | Tile => tiling(Some(Layout::Tile), None),
            Monocle => tiling(Some(Layout::Monocle), None),
            Horizontal => tiling(None, Some(Orientation::H)),
            Vertical => tiling(None, Some(Orientation::V)),
            Tiling => LayoutChange::MakeTiling,
            Floating => LayoutChange::MakeFloating,
        }
    }
}

/// Layout names accepted in the config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfiguredLayout {
    Tile,
    Tiles,
    Accordion,
    Monocle,
}

impl ConfiguredLayout {
    pub fn canonical(self) -> Layout {
        match self {
            ConfiguredLayout::Tile | ConfiguredLayout::Tiles | ConfiguredLayout::Accordion => {
                Layout::Tile
            }
            ConfiguredLayout::Monocle => Layout::Monocle,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultOrientation {
    Horizontal,
    Vertical,
    #[default]
    Auto,
}

impl DefaultOrientation {
    /// `monitor` is the workspace's monitor frame, if it has one.
    pub fn resolve(self, monitor: Option<Rect>) -> Orientation {
        match self {
            DefaultOrientation::Horizontal => Orientation::H,
            DefaultOrientation::Vertical => Orientation::V,
            DefaultOrientation::Auto => match monitor {
                Some(rect) => Orientation::for_rect(rect),
                None => Orientation::V,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::model::SystemContainerKind;

    fn tiled(layout: Layout, orientation: Orientation) -> Placement {
        Placement {
            root: Some(TilingContainerData { layout, orientation }),
            parent: Some(ParentKind::TilingContainer),
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn layout_tokens_parse() {
            let tokens = [
                ("h_accordion", LayoutDescription::HAccordion),
                ("v_accordion", LayoutDescription::VAccordion),
                ("h_tiles", LayoutDescription::HTiles),
                ("v_tiles", LayoutDescription::VTiles),
                ("accordion", LayoutDescription::Accordion),
                ("tiles", LayoutDescription::Tiles),
                ("tile", LayoutDescription::Tile),
                ("monocle", LayoutDescription::Monocle),
                ("horizontal", LayoutDescription::Horizontal),
                ("vertical", LayoutDescription::Vertical),
                ("tiling", LayoutDescription::Tiling),
                ("floating", LayoutDescription::Floating),
            ];
            for (token, expected) in tokens {
                assert_eq!(LayoutDescription::from_str(token).unwrap(), expected);
                assert_eq!(expected.to_string(), token);
                let json = serde_json::to_string(&expected).unwrap();
                assert_eq!(json, format!("\"{token}\""));
            }
            assert!(LayoutDescription::from_str("dwindle").is_err());
        }

        #[test]
        fn orientation_and_direction_tokens() {
            assert_eq!(Orientation::from_str("h").unwrap(), Orientation::H);
            assert_eq!(Orientation::V.to_string(), "v");
            assert_eq!(Direction::from_str("up").unwrap(), Direction::Up);
            assert_eq!(serde_json::to_string(&Orientation::V).unwrap(), "\"v\"");
        }
    }

    mod matcher {
        use super::*;

        #[test]
        fn tile_family_matches_tile_layout() {
            let p = tiled(Layout::Tile, Orientation::V);
            for d in [LayoutDescription::Tile, LayoutDescription::Tiles, LayoutDescription::Accordion]
            {
                assert!(d.matches(&p), "{d}");
            }
            assert!(!LayoutDescription::Monocle.matches(&p));
        }

        #[test]
        fn oriented_tokens_need_tile_and_orientation() {
            let p = tiled(Layout::Tile, Orientation::H);
            assert!(LayoutDescription::HTiles.matches(&p));
            assert!(LayoutDescription::HAccordion.matches(&p));
            assert!(!LayoutDescription::VTiles.matches(&p));

            let monocle = tiled(Layout::Monocle, Orientation::H);
            assert!(!LayoutDescription::HTiles.matches(&monocle));
            assert!(LayoutDescription::Horizontal.matches(&monocle));
            assert!(!LayoutDescription::Vertical.matches(&monocle));
        }

        #[test]
        fn tiling_and_floating_look_at_parent() {
            let tiling = tiled(Layout::Tile, Orientation::H);
            assert!(LayoutDescription::Tiling.matches(&tiling));
            assert!(!LayoutDescription::Floating.matches(&tiling));

            let floating = Placement {
                parent: Some(ParentKind::Workspace),
                ..tiling
            };
            assert!(LayoutDescription::Floating.matches(&floating));
            assert!(!LayoutDescription::Tiling.matches(&floating));
            // The root still decides layout tokens for floating windows.
            assert!(LayoutDescription::Tile.matches(&floating));

            let minimized = Placement {
                root: None,
                parent: Some(ParentKind::System(SystemContainerKind::Minimized)),
            };
            assert!(!LayoutDescription::Tiling.matches(&minimized));
            assert!(!LayoutDescription::Floating.matches(&minimized));
            assert!(!LayoutDescription::Tile.matches(&minimized));
        }

        #[test]
        fn changes() {
            assert_eq!(
                LayoutDescription::VTiles.change(),
                LayoutChange::Tiling {
                    layout: Some(Layout::Tile),
                    orientation: Some(Orientation::V),
                }
            );
            assert_eq!(
                LayoutDescription::Horizontal.change(),
                LayoutChange::Tiling { layout: None, orientation: Some(Orientation::H) }
            );
            assert_eq!(LayoutDescription::Floating.change(), LayoutChange::MakeFloating);
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn configured_layout_canonicalizes() {
            assert_eq!(ConfiguredLayout::Tiles.canonical(), Layout::Tile);
            assert_eq!(ConfiguredLayout::Accordion.canonical(), Layout::Tile);
            assert_eq!(ConfiguredLayout::Tile.canonical(), Layout::Tile);
            assert_eq!(ConfiguredLayout::Monocle.canonical(), Layout::Monocle);
        }

        #[test]
        fn auto_orientation_follows_monitor_shape() {
            let wide = Rect::new(0., 0., 1920., 1080.);
            let tall = Rect::new(0., 0., 1080., 1920.);
            assert_eq!(DefaultOrientation::Auto.resolve(Some(wide)), Orientation::H);
            assert_eq!(DefaultOrientation::Auto.resolve(Some(tall)), Orientation::V);
            assert_eq!(DefaultOrientation::Vertical.resolve(Some(wide)), Orientation::V);
            assert_eq!(DefaultOrientation::Horizontal.resolve(None), Orientation::H);
        }

        #[test]
        fn direction_offsets() {
            assert_eq!(Direction::Left.offset(), -1);
            assert_eq!(Direction::Up.offset(), -1);
            assert_eq!(Direction::Right.offset(), 1);
            assert_eq!(Direction::Down.offset(), 1);
        }
    }
}
