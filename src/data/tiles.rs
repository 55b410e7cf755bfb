//! Tile archetypes and the interned name/flavor tables they point into.
//!
//! Archetypes are registered once, the first time `tiles()` is called, and the
//! tables are read-only from then on. Records are small `Copy` values; the map
//! stores them by value.

use std::sync::OnceLock;

use bracket_terminal::prelude::{BLACK, RGB, WHITE};

/// A character with its foreground and background colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub fg: RGB,
    pub bg: RGB,
}

impl Glyph {
    pub fn new(ch: char, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> Self {
        Self {
            ch,
            fg: RGB::from_u8(fg.0, fg.1, fg.2),
            bg: RGB::from_u8(bg.0, bg.1, bg.2),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileRecord {
    pub walkable: bool,
    pub transparent: bool,
    /// Drawn when explored but out of view.
    pub dark: Glyph,
    /// Drawn while in view.
    pub light: Glyph,
    pub name_id: u16,
    pub flavor_id: u16,
}

pub struct TileDef {
    pub name: &'static str,
    pub flavor: &'static str,
    pub walkable: bool,
    pub transparent: bool,
    pub dark: Glyph,
    pub light: Glyph,
}

#[derive(Debug, Default)]
pub struct TileRegistry {
    names: Vec<String>,
    flavors: Vec<String>,
}

impl TileRegistry {
    pub fn register(&mut self, def: TileDef) -> TileRecord {
        TileRecord {
            walkable: def.walkable,
            transparent: def.transparent,
            dark: def.dark,
            light: def.light,
            name_id: intern(&mut self.names, def.name),
            flavor_id: intern(&mut self.flavors, def.flavor),
        }
    }

    pub fn name(&self, record: &TileRecord) -> &str {
        self.names
            .get(record.name_id as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn flavor(&self, record: &TileRecord) -> &str {
        self.flavors
            .get(record.flavor_id as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn flavor_count(&self) -> usize {
        self.flavors.len()
    }
}

// Linear scan; the vocabulary is a handful of words registered at startup.
fn intern(table: &mut Vec<String>, text: &str) -> u16 {
    if let Some(idx) = table.iter().position(|entry| entry == text) {
        return idx as u16;
    }
    table.push(text.to_string());
    (table.len() - 1) as u16
}

pub struct Tiles {
    pub registry: TileRegistry,
    pub floor: TileRecord,
    pub bloody_floor: TileRecord,
    pub wall: TileRecord,
    pub down_stairs: TileRecord,
}

impl Tiles {
    fn build() -> Self {
        let mut registry = TileRegistry::default();

        let floor = registry.register(TileDef {
            name: "floor",
            flavor: "When you fall, it will be there for you.",
            walkable: true,
            transparent: true,
            dark: Glyph::new(' ', (50, 50, 50), (7, 7, 7)),
            light: Glyph::new('.', (25, 25, 25), (10, 10, 10)),
        });
        let bloody_floor = registry.register(TileDef {
            name: "floor",
            flavor: "Stained with the viscera of your victims.",
            walkable: true,
            transparent: true,
            dark: Glyph::new(' ', (50, 50, 50), (7, 7, 7)),
            light: Glyph::new('.', (75, 0, 0), (10, 10, 10)),
        });
        let wall = registry.register(TileDef {
            name: "wall",
            flavor: "Solid inanimate material.",
            walkable: false,
            transparent: false,
            dark: Glyph::new(' ', (255, 255, 255), (25, 25, 30)),
            light: Glyph::new(' ', (255, 255, 255), (50, 50, 60)),
        });
        let down_stairs = registry.register(TileDef {
            name: "stairs",
            flavor: "Your passage to the next level.",
            walkable: true,
            transparent: true,
            dark: Glyph::new('>', (0, 100, 0), (0, 5, 0)),
            light: Glyph::new('>', (0, 255, 0), (0, 10, 0)),
        });

        Self {
            registry,
            floor,
            bloody_floor,
            wall,
            down_stairs,
        }
    }

    pub fn name_of(&self, record: &TileRecord) -> &str {
        self.registry.name(record)
    }

    pub fn flavor_of(&self, record: &TileRecord) -> &str {
        self.registry.flavor(record)
    }
}

static TILES: OnceLock<Tiles> = OnceLock::new();

pub fn tiles() -> &'static Tiles {
    TILES.get_or_init(Tiles::build)
}

/// Glyph for cells never seen nor mapped.
pub fn shroud() -> Glyph {
    Glyph {
        ch: ' ',
        fg: RGB::named(WHITE),
        bg: RGB::named(BLACK),
    }
}

/// Glyph for cells known from a map but never seen.
pub fn mapped() -> Glyph {
    Glyph::new('.', (100, 0, 100), (0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_shares_an_id() {
        let t = tiles();
        assert_eq!(t.floor.name_id, t.bloody_floor.name_id);
        assert_ne!(t.floor.flavor_id, t.bloody_floor.flavor_id);
        assert_eq!(t.name_of(&t.bloody_floor), "floor");
        assert_eq!(t.name_of(&t.down_stairs), "stairs");
    }

    #[test]
    fn registration_appends_only_new_text() {
        let mut registry = TileRegistry::default();
        let glyph = Glyph::new('#', (1, 2, 3), (0, 0, 0));
        let a = registry.register(TileDef {
            name: "rubble",
            flavor: "Loose stone.",
            walkable: false,
            transparent: true,
            dark: glyph,
            light: glyph,
        });
        let b = registry.register(TileDef {
            name: "rubble",
            flavor: "More loose stone.",
            walkable: false,
            transparent: true,
            dark: glyph,
            light: glyph,
        });
        assert_eq!(a.name_id, b.name_id);
        assert_eq!(registry.name_count(), 1);
        assert_eq!(registry.flavor_count(), 2);
        assert_eq!(registry.flavor(&b), "More loose stone.");
    }

    #[test]
    fn wall_blocks_everything() {
        let wall = tiles().wall;
        assert!(!wall.walkable);
        assert!(!wall.transparent);
        assert!(tiles().floor.walkable && tiles().floor.transparent);
    }
}
