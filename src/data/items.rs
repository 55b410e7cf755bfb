use bracket_terminal::prelude::RGB;

/// What happens when an item is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Usable {
    /// Thrown at a cell; hurts whoever stands there.
    Projectile { damage: i32 },
    /// Scrambles the target's wits for a number of turns.
    Confusion { turns: i32 },
    /// Reveals the current floor's layout.
    FloorPlan,
}

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub name: &'static str,
    /// Shown until the first item of this template has been used.
    pub unidentified: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub usable: Usable,
    pub description: &'static str,
}

impl ItemTemplate {
    pub fn rock() -> Self {
        Self {
            name: "rock",
            unidentified: "lumpy stone",
            glyph: '*',
            color: RGB::from_u8(128, 128, 128),
            usable: Usable::Projectile { damage: 1 },
            description: "do not place in mouth",
        }
    }

    pub fn smelling_salts() -> Self {
        Self {
            name: "smelling salts",
            unidentified: "corked vial",
            glyph: '!',
            color: RGB::from_u8(200, 120, 255),
            usable: Usable::Confusion { turns: 10 },
            description: "one whiff and the room spins",
        }
    }

    pub fn floor_plan() -> Self {
        Self {
            name: "floor plan",
            unidentified: "folded paper",
            glyph: '?',
            color: RGB::from_u8(230, 230, 200),
            usable: Usable::FloorPlan,
            description: "fire exits marked in red",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::rock(), Self::smelling_salts(), Self::floor_plan()]
    }
}
