use bracket_terminal::prelude::RGB;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Temperament {
    /// Hunts the player on sight.
    Hostile,
    /// Follows a daily routine between rooms.
    Civilian,
    /// Never moves.
    Statue,
}

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    /// `None` draws a fresh unique name from `NPC_NAMES` at spawn time.
    pub name: Option<&'static str>,
    /// `None` uses the first letter of the name.
    pub glyph: Option<char>,
    pub color: RGB,
    pub move_speed: i32,
    pub hp: i32,
    pub temperament: Temperament,
    pub description: &'static str,
}

pub const NPC_NAMES: [&str; 24] = [
    "Alice", "Bob", "Charlie", "Doug", "Emily", "Fred", "Grish", "Hal", "Ingus", "Josh", "Kzyl'xx",
    "Lu", "Mo", "Ned", "Otto", "Pete", "Quincy", "Rod", "Stu", "Tim", "Ulga", "Viv", "Yan", "Zed",
];

impl MonsterTemplate {
    pub fn civilian() -> Self {
        Self {
            name: None,
            glyph: None,
            color: RGB::from_u8(200, 200, 160),
            move_speed: 1,
            hp: 1,
            temperament: Temperament::Civilian,
            description: "a foolish human",
        }
    }

    pub fn guard() -> Self {
        Self {
            name: Some("security guard"),
            glyph: Some('g'),
            color: RGB::from_u8(90, 140, 255),
            move_speed: 1,
            hp: 3,
            temperament: Temperament::Hostile,
            description: "armed, alert, and looking for you",
        }
    }

    pub fn hound() -> Self {
        Self {
            name: Some("security hound"),
            glyph: Some('h'),
            color: RGB::from_u8(180, 120, 60),
            move_speed: 2,
            hp: 2,
            temperament: Temperament::Hostile,
            description: "fast, and it can smell fear",
        }
    }

    pub fn mannequin() -> Self {
        Self {
            name: Some("mannequin"),
            glyph: Some('m'),
            color: RGB::from_u8(150, 150, 150),
            move_speed: 0,
            hp: 1,
            temperament: Temperament::Statue,
            description: "it has not moved. yet.",
        }
    }

    /// Spawn table for a floor; deeper floors mix in more security.
    pub fn for_floor(floor: u32) -> Vec<Self> {
        match floor {
            0 | 1 => vec![Self::civilian(), Self::civilian(), Self::mannequin()],
            2 | 3 => vec![Self::civilian(), Self::civilian(), Self::guard()],
            4 | 5 => vec![Self::civilian(), Self::guard(), Self::hound()],
            _ => vec![Self::guard(), Self::hound(), Self::civilian()],
        }
    }
}
