use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, Entity, NullStorage, VecStorage};

use crate::{data::items::Usable, map::FloorId};

/// Where an on-floor entity stands. Items in a backpack have none.
#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
    pub floor: FloorId,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: char,
    pub color: RGB,
    pub order: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Name {
    pub name: String,
    pub description: String,
}

impl Component for Name {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Actor {
    /// Steps an AI may queue in one turn.
    pub move_speed: i32,
}

impl Component for Actor {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Vitality {
    pub max_hp: i32,
    pub hp: i32,
    pub cause_of_death: Option<String>,
}

impl Vitality {
    pub fn new(hp: i32) -> Self {
        Self {
            max_hp: hp,
            hp,
            cause_of_death: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

impl Component for Vitality {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Item {
    /// Template name; identification is shared by every item of a template.
    pub template: &'static str,
    pub usable: Usable,
    pub unidentified: &'static str,
}

impl Component for Item {
    type Storage = VecStorage<Self>;
}

/// Marks an item as carried. `order` keeps the backpack in pickup order.
#[derive(Clone, Debug)]
pub struct InBackpack {
    pub owner: Entity,
    pub order: u64,
}

impl Component for InBackpack {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Confused,
    BeingEaten,
}

impl StatusKind {
    pub fn description(&self) -> &'static str {
        match self {
            StatusKind::Confused => "confused",
            StatusKind::BeingEaten => "being eaten",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: i32,
}

#[derive(Clone, Debug, Default)]
pub struct StatusEffects {
    pub effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    /// Apply a status, or lengthen it if already present.
    pub fn apply(&mut self, kind: StatusKind, duration: i32) {
        if let Some(effect) = self.effects.iter_mut().find(|effect| effect.kind == kind) {
            effect.duration += duration;
        } else {
            self.effects.push(StatusEffect { kind, duration });
        }
    }

    pub fn remove(&mut self, kind: StatusKind) {
        self.effects.retain(|effect| effect.kind != kind);
    }

    /// Count every effect down by a turn and return the ones that ran out.
    pub fn tick(&mut self) -> Vec<StatusKind> {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            effect.duration -= 1;
            if effect.duration < 1 {
                expired.push(effect.kind);
            }
        }
        self.effects.retain(|effect| effect.duration >= 1);
        expired
    }
}

impl Component for StatusEffects {
    type Storage = VecStorage<Self>;
}

/// An NPC's daily schedule and biological clock.
#[derive(Clone, Debug, Default)]
pub struct Routine {
    /// `(hour, room index)` pairs; a block starts an hour before its key.
    pub schedule: Vec<(u32, usize)>,
    pub turns_since_relief: u32,
}

impl Routine {
    pub fn scheduled_room(&self, hour: u32) -> Option<usize> {
        let mut block = 0;
        for &(start, _) in &self.schedule {
            if start <= hour + 1 && start > block {
                block = start;
            }
        }
        if block == 0 {
            block = 22;
        }
        self.schedule
            .iter()
            .find(|(start, _)| *start == block)
            .map(|(_, room)| *room)
    }
}

impl Component for Routine {
    type Storage = VecStorage<Self>;
}
