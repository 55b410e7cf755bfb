use specs::prelude::*;

use super::{
    components::{Name, PlayerTag, Routine, StatusEffects, StatusKind},
    resources::MessageLog,
};
use crate::ai::{Brain, Strategy};

/// Counts statuses down once per turn. A confusion that wears off hands the
/// actor back to whatever it was doing before.
pub struct StatusSystem;

impl<'a> System<'a> for StatusSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, StatusEffects>,
        WriteStorage<'a, Brain>,
        ReadStorage<'a, Name>,
        ReadStorage<'a, PlayerTag>,
        Write<'a, MessageLog>,
    );

    fn run(&mut self, (entities, mut statuses, mut brains, names, players, mut log): Self::SystemData) {
        for (entity, status) in (&entities, &mut statuses).join() {
            for kind in status.tick() {
                if kind == StatusKind::Confused {
                    if let Some(brain) = brains.get_mut(entity) {
                        if matches!(brain.active, Strategy::Confused) {
                            brain.revert();
                        }
                    }
                }
                if players.contains(entity) {
                    log.push(format!("You are no longer {}.", kind.description()));
                } else if let Some(name) = names.get(entity) {
                    log.push(format!("{} is no longer {}.", name.name, kind.description()));
                }
            }
        }
    }
}

pub struct NeedClockSystem;

impl<'a> System<'a> for NeedClockSystem {
    type SystemData = WriteStorage<'a, Routine>;

    fn run(&mut self, mut routines: Self::SystemData) {
        for routine in (&mut routines).join() {
            routine.turns_since_relief = routine.turns_since_relief.saturating_add(1);
        }
    }
}
