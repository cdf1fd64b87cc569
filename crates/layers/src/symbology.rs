use scene::marker_state::{Emphasis, MarkerState, Representation};

pub const LABEL_Z_HIDDEN: i32 = 0;
pub const LABEL_Z_ACCEPTED: i32 = 10;
pub const LABEL_Z_HOVERED: i32 = 20;

/// Palette slot for a marker; the host maps tokens to actual colors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Unvisited,
    Visited,
    Accent,
}

/// Everything the rendering layer needs to draw a marker's current look.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Appearance {
    pub emphasis: Emphasis,
    pub color: ColorToken,
    /// Accented overlay drawn on top of the marker when selected or hovered.
    pub overlay: bool,
    pub z_index: i32,
}

pub fn marker_appearance(state: MarkerState, representation: Representation) -> Appearance {
    let base_z = match representation {
        Representation::Card => 20,
        Representation::Dot => 10,
    };
    let emphasis = state.emphasis();
    let (color, overlay, z_index) = match emphasis {
        Emphasis::Selected => (ColorToken::Accent, true, 300),
        Emphasis::Hovered => (ColorToken::Accent, true, 200),
        Emphasis::Viewed => (ColorToken::Visited, false, base_z),
        Emphasis::Default => (ColorToken::Unvisited, false, base_z),
    };
    Appearance {
        emphasis,
        color,
        overlay,
        z_index,
    }
}
