//! Per-actor decision making.
//!
//! Every actor with a [`Brain`] runs one [`Strategy`]. A strategy turns the
//! current board into an intent: an ordered list of [`Action`]s for this turn.
//! Transient conditions (confusion, being eaten, a full bladder) push an
//! override strategy on top of the base one and hand control back by
//! reverting; the stack is never deeper than two.

pub mod hostile;
pub mod npc;

use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{Component, Entity, VecStorage};
use tracing::debug;

use crate::{
    actions::Action,
    config::GameConfig,
    ecs::{EcsWorld, components::StatusKind},
    map::{DIRECTIONS, GameMap},
};

pub use hostile::HostileState;
pub use npc::{NpcState, ReliefState};

const DISTRESS: &str = "Mmmf! Mmmmmf!";

#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    Hostile(HostileState),
    Statue,
    Confused,
    DefaultNpc(NpcState),
    BeingEaten,
    NeedsToRelieve(ReliefState),
    /// Driven from outside; never decides.
    Player,
}

impl Strategy {
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Hostile(state) if state.last_target.is_some() => "hostile",
            Strategy::Hostile(_) => "asleep",
            Strategy::Statue => "docile",
            Strategy::Confused => "confused",
            Strategy::DefaultNpc(_) => "going about their day",
            Strategy::BeingEaten => "being eaten",
            Strategy::NeedsToRelieve(_) => "looking for a restroom",
            Strategy::Player => "you",
        }
    }

    pub fn decide(&mut self, actor: Entity, ctx: &mut DecisionContext) -> Vec<Action> {
        match self {
            Strategy::Hostile(state) => hostile::decide(state, actor, ctx),
            Strategy::Statue => vec![Action::Wait { actor }],
            Strategy::Confused => stumble(actor, ctx),
            Strategy::DefaultNpc(state) => npc::decide(state, actor, ctx),
            Strategy::BeingEaten => vec![
                Action::Talk {
                    actor,
                    dx: 0,
                    dy: 0,
                    line: Some(DISTRESS),
                },
                Action::Wait { actor },
            ],
            Strategy::NeedsToRelieve(state) => npc::relieve(state, actor, ctx),
            Strategy::Player => Vec::new(),
        }
    }
}

/// `move_speed` bumps in random compass directions.
fn stumble(actor: Entity, ctx: &mut DecisionContext) -> Vec<Action> {
    let speed = ctx.ecs.move_speed(actor).max(0);
    (0..speed)
        .map(|_| {
            let (dx, dy) = DIRECTIONS[ctx.rng.range(0, DIRECTIONS.len() as i32) as usize];
            Action::Bump { actor, dx, dy }
        })
        .collect()
}

/// The intent decided for this turn, kept until explicitly invalidated so a
/// peek and the following turn see the same plan.
#[derive(Clone, Debug, Default)]
pub struct IntentCache {
    cached: Vec<Action>,
    valid: bool,
}

impl IntentCache {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn store(&mut self, intent: Vec<Action>) {
        self.cached = intent;
        self.valid = true;
    }

    pub fn invalidate(&mut self) {
        self.cached.clear();
        self.valid = false;
    }
}

/// What the board looks like to a deciding actor.
pub struct DecisionContext<'a> {
    pub map: &'a GameMap,
    pub ecs: &'a EcsWorld,
    pub config: &'a GameConfig,
    pub rng: &'a mut RandomNumberGenerator,
    pub hour: u32,
}

#[derive(Clone, Debug)]
pub struct Brain {
    pub active: Strategy,
    /// The base strategy while an override runs.
    pub suspended: Option<Strategy>,
    pub intent: IntentCache,
}

impl Component for Brain {
    type Storage = VecStorage<Self>;
}

impl Brain {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            active: strategy,
            suspended: None,
            intent: IntentCache::default(),
        }
    }

    pub fn description(&self) -> &'static str {
        self.active.description()
    }

    pub fn is_overridden(&self) -> bool {
        self.suspended.is_some()
    }

    /// Run `strategy` on top of the base one. A second override replaces the
    /// first; the base stays put.
    pub fn push_override(&mut self, strategy: Strategy) {
        if self.suspended.is_none() {
            self.suspended = Some(std::mem::replace(&mut self.active, strategy));
        } else {
            self.active = strategy;
        }
        self.intent.invalidate();
    }

    pub fn revert(&mut self) {
        if let Some(base) = self.suspended.take() {
            self.active = base;
            self.intent.invalidate();
        }
    }

    /// Swap in or out of overrides before deciding. Highest priority first:
    /// being eaten, panic, then the need timer. The need only takes over
    /// while some restroom on the floor is free; otherwise the NPC keeps to
    /// its routine and the timer keeps running.
    pub fn resolve_overrides(
        &mut self,
        actor: Entity,
        map: &GameMap,
        ecs: &mut EcsWorld,
        config: &GameConfig,
    ) {
        if matches!(self.active, Strategy::Player) {
            return;
        }

        if ecs.has_status(actor, StatusKind::BeingEaten) {
            if !matches!(self.active, Strategy::BeingEaten) {
                self.push_override(Strategy::BeingEaten);
            }
            return;
        }
        if matches!(self.active, Strategy::BeingEaten) {
            self.revert();
        }

        if self.panicking() {
            return;
        }

        if let Strategy::NeedsToRelieve(state) = &self.active {
            if state.remaining == 0 {
                self.revert();
                ecs.reset_need_timer(actor);
            } else if !npc::restroom_reachable(state, map, ecs, actor) {
                debug!(actor = actor.id(), "no free restroom, holding it");
                self.revert();
            }
            return;
        }

        if matches!(self.active, Strategy::DefaultNpc(_)) && !self.is_overridden() {
            let overdue = ecs
                .routine(actor)
                .is_some_and(|routine| routine.turns_since_relief > config.need_threshold);
            let restroom = || {
                ecs.position(actor)
                    .and_then(|origin| npc::free_restroom(map, ecs, actor, origin))
                    .is_some()
            };
            if overdue && restroom() {
                self.push_override(Strategy::NeedsToRelieve(ReliefState::new(
                    config.relief_duration,
                )));
            }
        }
    }

    // Nothing panics yet; the slot sits between being eaten and needs.
    fn panicking(&self) -> bool {
        false
    }

    /// The cached intent, deciding it first if there is none.
    pub fn intent(&mut self, actor: Entity, ctx: &mut DecisionContext) -> Vec<Action> {
        if !self.intent.is_valid() {
            let planned = self.active.decide(actor, ctx);
            self.intent.store(planned);
        }
        self.intent.cached.clone()
    }
}
