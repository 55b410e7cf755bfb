//! Atomic things an actor can do. Every action either changes the world or
//! fails with [`Impossible`] and leaves it untouched.

use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

use crate::{
    ai::{Brain, Strategy},
    data::items::Usable,
    ecs::{components::StatusKind, resources::EventKind},
    engine::Engine,
    error::{ActionError, Impossible},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Movement { actor: Entity, dx: i32, dy: i32 },
    /// Melee or talk to whoever blocks the way, otherwise move. Resolved at
    /// execution time so earlier steps of the same intent are accounted for.
    Bump { actor: Entity, dx: i32, dy: i32 },
    Melee { actor: Entity, dx: i32, dy: i32 },
    /// Speak toward a neighbor; `line` replaces the greeting, and a zero
    /// offset with a line is talking to oneself.
    Talk {
        actor: Entity,
        dx: i32,
        dy: i32,
        line: Option<&'static str>,
    },
    Pickup { actor: Entity },
    /// Use a carried item. Without a target it acts on the user's own cell.
    UseItem {
        actor: Entity,
        item: Entity,
        target: Option<Point>,
    },
    /// Like `UseItem`, but an empty cell falls back to an item lying there.
    Throw {
        actor: Entity,
        item: Entity,
        target: Point,
    },
    Wait { actor: Entity },
    TakeStairs { actor: Entity },
    /// Bite a neighbor. The first bite pins them for a few turns; biting
    /// someone already pinned finishes them off.
    Eat { actor: Entity, dx: i32, dy: i32 },
}

/// How a performed action ended. `Meleed` spends the rest of the actor's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Performed {
    Done,
    Meleed,
}

impl Action {
    pub fn actor(&self) -> Entity {
        match *self {
            Action::Movement { actor, .. }
            | Action::Bump { actor, .. }
            | Action::Melee { actor, .. }
            | Action::Talk { actor, .. }
            | Action::Pickup { actor }
            | Action::UseItem { actor, .. }
            | Action::Throw { actor, .. }
            | Action::Wait { actor }
            | Action::TakeStairs { actor }
            | Action::Eat { actor, .. } => actor,
        }
    }

    pub fn perform(&self, engine: &mut Engine) -> Result<Performed, ActionError> {
        match *self {
            Action::Movement { actor, dx, dy } => movement(engine, actor, dx, dy),
            Action::Bump { actor, dx, dy } => bump(engine, actor, dx, dy),
            Action::Melee { actor, dx, dy } => melee(engine, actor, dx, dy),
            Action::Talk {
                actor,
                dx,
                dy,
                line,
            } => talk(engine, actor, dx, dy, line),
            Action::Pickup { actor } => pickup(engine, actor),
            Action::UseItem {
                actor,
                item,
                target,
            } => use_item(engine, actor, item, target, false),
            Action::Throw {
                actor,
                item,
                target,
            } => use_item(engine, actor, item, Some(target), true),
            Action::Wait { .. } => Ok(Performed::Done),
            Action::TakeStairs { actor } => take_stairs(engine, actor),
            Action::Eat { actor, dx, dy } => eat(engine, actor, dx, dy),
        }
    }
}

fn impossible(reason: &str) -> ActionError {
    Impossible::new(reason).into()
}

fn destination(engine: &Engine, actor: Entity, dx: i32, dy: i32) -> Option<Point> {
    engine
        .ecs
        .position(actor)
        .map(|point| Point::new(point.x + dx, point.y + dy))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn movement(engine: &mut Engine, actor: Entity, dx: i32, dy: i32) -> Result<Performed, ActionError> {
    let Some(dest) = destination(engine, actor, dx, dy) else {
        return Err(impossible("That way is blocked."));
    };
    if !engine.map.tile_is_walkable(&engine.ecs, dest) {
        return Err(impossible("That way is blocked."));
    }
    engine.ecs.set_position(actor, dest);
    Ok(Performed::Done)
}

fn is_aggressive(brain: Option<Brain>) -> bool {
    brain.is_some_and(|brain| matches!(brain.active, Strategy::Hostile(_) | Strategy::Confused))
}

fn bump(engine: &mut Engine, actor: Entity, dx: i32, dy: i32) -> Result<Performed, ActionError> {
    let Some(dest) = destination(engine, actor, dx, dy) else {
        return Err(impossible("That way is blocked."));
    };
    let Some(blocker) = engine.map.blocking_entity_at(&engine.ecs, dest) else {
        return movement(engine, actor, dx, dy);
    };

    // The player fights hostiles and chats with everyone else; NPCs fight
    // only when hostile or out of their minds.
    let fight = if engine.ecs.is_player(actor) {
        is_aggressive(engine.ecs.brain(blocker))
    } else {
        is_aggressive(engine.ecs.brain(actor))
    };
    if fight {
        melee(engine, actor, dx, dy)?;
    } else {
        talk(engine, actor, dx, dy, None)?;
    }
    Ok(Performed::Meleed)
}

fn melee(engine: &mut Engine, actor: Entity, dx: i32, dy: i32) -> Result<Performed, ActionError> {
    let target = destination(engine, actor, dx, dy)
        .and_then(|dest| engine.map.actor_at(&engine.ecs, dest))
        .ok_or_else(|| impossible("Nothing to attack."))?;

    let attacker = engine.ecs.name(actor);
    let victim = engine.ecs.name(target);
    if engine.ecs.is_player(actor) {
        engine.ecs.log(format!("You attack {victim}!"));
    } else {
        engine
            .ecs
            .log(format!("{} attacks {victim}!", capitalize(&attacker)));
    }

    let damage = engine.config.melee_damage;
    if engine.ecs.damage(target, damage).is_some_and(|hp| hp <= 0) {
        engine.kill(target, &attacker);
    }
    Ok(Performed::Done)
}

fn talk(
    engine: &mut Engine,
    actor: Entity,
    dx: i32,
    dy: i32,
    line: Option<&'static str>,
) -> Result<Performed, ActionError> {
    let speaker = capitalize(&engine.ecs.name(actor));
    let text = match line {
        Some(line) => format!("{speaker}: {line}"),
        None => {
            let listener = destination(engine, actor, dx, dy)
                .and_then(|dest| engine.map.actor_at(&engine.ecs, dest))
                .filter(|listener| *listener != actor);
            match listener {
                Some(listener) => {
                    format!("{speaker}: Hello there, {}!", engine.ecs.name(listener))
                }
                None => format!("{speaker} mutters to no one in particular."),
            }
        }
    };
    engine.ecs.log(text);
    Ok(Performed::Done)
}

fn pickup(engine: &mut Engine, actor: Entity) -> Result<Performed, ActionError> {
    let Some(point) = engine.ecs.position(actor) else {
        return Ok(Performed::Done);
    };
    for item in engine.ecs.items_at(engine.map.floor, point) {
        let label = engine.ecs.item_label(item);
        let name = engine.ecs.name(item);
        engine.ecs.stow(actor, item);
        if engine.ecs.is_player(actor) {
            engine.ecs.log(format!("You pick up the {label}."));
        } else {
            let who = capitalize(&engine.ecs.name(actor));
            engine.ecs.log(format!("{who} picks up the {label}."));
        }
        engine.ecs.record(EventKind::PickupItem, name);
    }
    Ok(Performed::Done)
}

/// Resolve the target, fire the item's effect, then consume and identify it.
/// Nothing is consumed when the effect cannot happen.
fn use_item(
    engine: &mut Engine,
    actor: Entity,
    item: Entity,
    target: Option<Point>,
    thrown: bool,
) -> Result<Performed, ActionError> {
    let details = engine
        .ecs
        .item(item)
        .filter(|_| engine.ecs.inventory(actor).contains(&item))
        .ok_or_else(|| impossible("You don't have that."))?;
    let label = engine.ecs.item_label(item);
    let user = if engine.ecs.is_player(actor) {
        "You".to_string()
    } else {
        capitalize(&engine.ecs.name(actor))
    };

    match details.usable {
        Usable::Projectile { damage } => {
            let point = target.ok_or_else(|| impossible("You need a target to throw at."))?;
            let victim = engine.map.actor_at(&engine.ecs, point);
            let struck = if thrown && victim.is_none() {
                engine.map.item_at(&engine.ecs, point)
            } else {
                None
            };
            match (victim, struck) {
                (Some(victim), _) => {
                    let name = engine.ecs.name(victim);
                    engine.ecs.log(format!("{user} use the {label} on {name}."));
                    engine
                        .ecs
                        .log(format!("{} takes {damage} damage!", capitalize(&name)));
                    if engine.ecs.damage(victim, damage).is_some_and(|hp| hp <= 0) {
                        let cause = engine.ecs.name(actor);
                        engine.kill(victim, &cause);
                    }
                }
                (None, Some(other)) => {
                    let other = engine.ecs.item_label(other);
                    engine.ecs.log(format!("{user} use the {label} on the {other}."));
                    engine.ecs.log("Nothing happens.");
                }
                (None, None) => {
                    engine.ecs.log(format!("{user} use the {label}."));
                    engine.ecs.log("Nothing happens.");
                }
            }
        }
        Usable::Confusion { turns } => {
            let point = target
                .or_else(|| engine.ecs.position(actor))
                .ok_or_else(|| impossible("There is no one there."))?;
            let victim = engine
                .map
                .actor_at(&engine.ecs, point)
                .ok_or_else(|| impossible("There is no one there."))?;
            engine.ecs.log(format!("{user} use the {label}."));
            confuse(engine, victim, turns);
        }
        Usable::FloorPlan => {
            engine.ecs.log(format!("{user} unfold the {label}."));
            engine.map.make_mapped();
            engine.ecs.log("The layout of this floor is revealed.");
        }
    }

    engine.ecs.despawn(item);
    if engine.ecs.identify(details.template) {
        engine.ecs.record(EventKind::IdentifyItem, details.template);
    }
    engine.ecs.record(EventKind::UseItem, details.template);
    Ok(Performed::Done)
}

fn confuse(engine: &mut Engine, victim: Entity, turns: i32) {
    engine.ecs.apply_status(victim, StatusKind::Confused, turns);
    if engine.ecs.is_player(victim) {
        engine.ecs.log("The room spins around you.");
        return;
    }
    if let Some(mut brain) = engine.ecs.brain(victim) {
        if !matches!(brain.active, Strategy::Confused) {
            brain.push_override(Strategy::Confused);
            engine.ecs.set_brain(victim, brain);
        }
    }
    let name = capitalize(&engine.ecs.name(victim));
    engine.ecs.log(format!("{name} looks confused."));
}

fn eat(engine: &mut Engine, actor: Entity, dx: i32, dy: i32) -> Result<Performed, ActionError> {
    if !engine.ecs.is_player(actor) {
        return Err(impossible("Only the player eats people."));
    }
    let victim = destination(engine, actor, dx, dy)
        .and_then(|dest| engine.map.actor_at(&engine.ecs, dest))
        .filter(|victim| *victim != actor)
        .ok_or_else(|| impossible("There is no one there to eat."))?;
    let name = engine.ecs.name(victim);
    if engine
        .ecs
        .brain(victim)
        .is_some_and(|brain| matches!(brain.active, Strategy::Hostile(_)))
    {
        return Err(impossible(&format!("{} won't hold still.", capitalize(&name))));
    }

    if engine.ecs.has_status(victim, StatusKind::BeingEaten) {
        engine.ecs.log(format!("You devour {name}."));
        let cause = engine.ecs.name(actor);
        engine.kill(victim, &cause);
    } else {
        engine
            .ecs
            .apply_status(victim, StatusKind::BeingEaten, engine.config.eat_duration);
        engine.ecs.log(format!("You sink your teeth into {name}."));
    }
    Ok(Performed::Meleed)
}

fn take_stairs(engine: &mut Engine, actor: Entity) -> Result<Performed, ActionError> {
    let here = engine.ecs.position(actor);
    if !engine.ecs.is_player(actor) || here != Some(engine.map.downstairs) {
        return Err(impossible("There are no stairs here."));
    }
    engine.descend()?;
    engine.ecs.log("You descend the staircase.");
    engine.ecs.record(
        EventKind::DescendStairs,
        engine.map.floor_number().to_string(),
    );
    Ok(Performed::Done)
}
