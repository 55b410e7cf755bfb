//! The turn loop: one player action, then every other actor on the floor in
//! entity order, then end-of-turn bookkeeping.

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;
use tracing::{debug, info};

use crate::{
    actions::{Action, Performed},
    ai::{DecisionContext, Strategy},
    config::GameConfig,
    ecs::{EcsWorld, resources::EventKind},
    error::{ActionError, GenerationError, Impossible},
    map::{GameMap, pathing::compute_fov},
    procgen::{SpawnRequest, generate_floor},
};

/// Turns per in-game hour on the NPC schedule clock.
const TURNS_PER_HOUR: u64 = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The action happened and everyone else took their turn.
    Consumed,
    /// The action could not happen; nothing moved.
    Rejected(Impossible),
}

pub struct Engine {
    pub config: GameConfig,
    pub map: GameMap,
    pub ecs: EcsWorld,
    pub rng: RandomNumberGenerator,
}

impl Engine {
    /// Start a run on a freshly generated first floor.
    pub fn new(config: GameConfig) -> Result<Self, GenerationError> {
        let mut rng = RandomNumberGenerator::seeded(config.seed);
        let layout = generate_floor(&config, 1, &mut rng)?;
        let ecs = EcsWorld::new(layout.player_start, layout.map.floor);
        let mut engine = Self {
            config,
            map: layout.map,
            ecs,
            rng,
        };
        engine.spawn_all(&layout.spawns);
        engine.update_fov();
        info!(seed = engine.config.seed, "run started");
        Ok(engine)
    }

    /// Start on a prepared map with nobody but the player on it.
    pub fn with_map(config: GameConfig, map: GameMap, player_start: Point) -> Self {
        let rng = RandomNumberGenerator::seeded(config.seed);
        let ecs = EcsWorld::new(player_start, map.floor);
        let mut engine = Self {
            config,
            map,
            ecs,
            rng,
        };
        engine.update_fov();
        engine
    }

    fn spawn_all(&mut self, spawns: &[SpawnRequest]) {
        for spawn in spawns {
            match spawn {
                SpawnRequest::Monster { template, point } => {
                    self.ecs
                        .spawn_monster(template, *point, &self.map, &mut self.rng);
                }
                SpawnRequest::Item { template, point } => {
                    self.ecs.spawn_item(template, *point, self.map.floor);
                }
            }
        }
    }

    /// Perform the player's action. A refused action is logged and costs no
    /// time; anything else hands the turn to the rest of the floor.
    pub fn handle_player_action(&mut self, action: &Action) -> Result<TurnOutcome, GenerationError> {
        if !self.ecs.player_alive() {
            return Ok(TurnOutcome::Rejected(Impossible::new("You are dead.")));
        }
        match action.perform(self) {
            Ok(_) => {
                self.handle_enemy_turns()?;
                self.update_fov();
                Ok(TurnOutcome::Consumed)
            }
            Err(ActionError::Impossible(reason)) => {
                self.ecs.log(reason.reason());
                Ok(TurnOutcome::Rejected(reason))
            }
            Err(ActionError::Generation(err)) => Err(err),
        }
    }

    /// Every living non-player actor on the floor acts once, lowest entity id
    /// first. Stops early if the player dies.
    pub fn handle_enemy_turns(&mut self) -> Result<(), GenerationError> {
        let player = self.ecs.player_entity();
        for actor in self.ecs.living_actors(self.map.floor) {
            if actor == player || !self.ecs.is_alive(actor) {
                continue;
            }
            self.run_actor_turn(actor)?;
            if !self.ecs.player_alive() {
                return Ok(());
            }
        }
        self.ecs.tick();
        Ok(())
    }

    /// Resolve overrides, decide, then play the intent out until it ends,
    /// melees, or runs into something impossible.
    pub fn run_actor_turn(&mut self, actor: Entity) -> Result<(), GenerationError> {
        let Some(mut brain) = self.ecs.brain(actor) else {
            return Ok(());
        };
        if matches!(brain.active, Strategy::Player) {
            return Ok(());
        }

        brain.resolve_overrides(actor, &self.map, &mut self.ecs, &self.config);
        let intent = {
            let mut ctx = self.decision_context();
            brain.intent(actor, &mut ctx)
        };
        brain.intent.invalidate();
        self.ecs.set_brain(actor, brain);

        for action in intent {
            match action.perform(self) {
                Ok(Performed::Meleed) => break,
                Ok(Performed::Done) => {}
                Err(ActionError::Impossible(reason)) => {
                    debug!(actor = actor.id(), reason = reason.reason(), "intent cut short");
                    break;
                }
                Err(ActionError::Generation(err)) => return Err(err),
            }
            if !self.ecs.is_alive(actor) {
                break;
            }
        }
        Ok(())
    }

    pub fn decision_context(&mut self) -> DecisionContext<'_> {
        let hour = self.hour();
        DecisionContext {
            map: &self.map,
            ecs: &self.ecs,
            config: &self.config,
            rng: &mut self.rng,
            hour,
        }
    }

    /// What `actor` plans to do next turn. The plan is cached, so the turn
    /// that follows carries out exactly this intent.
    pub fn peek_intent(&mut self, actor: Entity) -> Vec<Action> {
        let Some(mut brain) = self.ecs.brain(actor) else {
            return Vec::new();
        };
        let intent = {
            let mut ctx = self.decision_context();
            brain.intent(actor, &mut ctx)
        };
        self.ecs.set_brain(actor, brain);
        intent
    }

    pub fn hour(&self) -> u32 {
        ((self.ecs.turn / TURNS_PER_HOUR) % 24) as u32
    }

    /// Recompute the player's view and fold it into the explored plane.
    pub fn update_fov(&mut self) {
        let origin = self.ecs.player_point();
        let fov = compute_fov(
            &self.map.transparency_mask(),
            self.map.width,
            self.map.height,
            origin,
            self.config.fov_radius,
        );
        self.map.update_visibility(&fov);
    }

    /// Living actors the player can see, or sense through walls.
    pub fn perceived_actors(&self) -> Vec<Entity> {
        let player = self.ecs.player_entity();
        let origin = self.ecs.player_point();
        self.ecs
            .living_actors(self.map.floor)
            .into_iter()
            .filter(|actor| *actor != player)
            .filter(|actor| {
                self.ecs.position(*actor).is_some_and(|point| {
                    self.map.is_visible(point)
                        || self.map.smellable(origin, point, false, &self.config)
                })
            })
            .collect()
    }

    /// Replace the current floor with a freshly generated one below it. The
    /// player and whatever it carries come along; everything else stays
    /// behind and is dropped.
    pub fn descend(&mut self) -> Result<(), GenerationError> {
        let next = self.map.floor_number() + 1;
        let layout = generate_floor(&self.config, next, &mut self.rng)?;
        self.ecs.clear_floor(self.map.floor);
        self.ecs
            .move_player_to(layout.player_start, layout.map.floor);
        self.map = layout.map;
        self.spawn_all(&layout.spawns);
        self.update_fov();
        info!(floor = next, turn = self.ecs.turn, "descended");
        Ok(())
    }

    /// Remove a slain actor. The player leaves remains instead.
    pub fn kill(&mut self, target: Entity, cause: &str) {
        if self.ecs.is_player(target) {
            self.ecs.mark_player_dead(cause);
            self.ecs.log("You died!");
            self.ecs.record(EventKind::Death, cause);
            info!(cause, turn = self.ecs.turn, "player died");
            return;
        }

        let name = self.ecs.name(target);
        self.ecs.log(format!("{name} is dead!"));
        self.ecs.record(EventKind::KillEnemy, name.as_str());
        if let Some(point) = self.ecs.position(target) {
            self.map.mark_blood(point);
            for item in self.ecs.inventory(target) {
                self.ecs.drop_item(item, point, self.map.floor);
            }
        }
        self.ecs.despawn(target);
    }

    pub fn history_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.ecs.history())
    }
}
