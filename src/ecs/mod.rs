pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};
use tracing::{debug, warn};

use crate::{
    ai::{Brain, Strategy},
    data::{
        items::ItemTemplate,
        monsters::{MonsterTemplate, NPC_NAMES, Temperament},
    },
    map::{FloorId, GameMap, RoomKind},
};

use self::{
    components::{
        Actor, BlocksTile, InBackpack, Item, Name, PlayerTag, Position, Renderable, Routine,
        StatusEffects, StatusKind, Vitality,
    },
    resources::{EventKind, History, HistoryEvent, ItemKnowledge, Message, MessageLog},
    systems::{NeedClockSystem, StatusSystem},
};

/// Hours at which a civilian's schedule moves it to a new room.
pub const SCHEDULE_BLOCKS: [u32; 4] = [8, 12, 18, 22];
/// Fresh NPCs start somewhere in this many turns of their need cycle.
const NEED_SPREAD: i32 = 240;
const PLAYER_HP: i32 = 1;

pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
    pickups: u64,
    pub turn: u64,
}

impl EcsWorld {
    pub fn new(spawn: Point, floor: FloorId) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(MessageLog::default());
        specs_world.insert(History::default());
        specs_world.insert(ItemKnowledge::default());
        let player = Self::spawn_player(&mut specs_world, spawn, floor);
        let dispatcher = DispatcherBuilder::new()
            .with(StatusSystem, "status", &[])
            .with(NeedClockSystem, "need_clock", &[])
            .build();

        Self {
            specs_world,
            dispatcher,
            player,
            pickups: 0,
            turn: 0,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Name>();
        world.register::<Actor>();
        world.register::<Vitality>();
        world.register::<BlocksTile>();
        world.register::<PlayerTag>();
        world.register::<Item>();
        world.register::<InBackpack>();
        world.register::<StatusEffects>();
        world.register::<Routine>();
        world.register::<Brain>();
    }

    fn spawn_player(world: &mut SpecsWorld, spawn: Point, floor: FloorId) -> Entity {
        world
            .create_entity()
            .with(Position {
                point: spawn,
                floor,
            })
            .with(Renderable {
                glyph: '@',
                color: RGB::from_u8(255, 255, 255),
                order: 2,
            })
            .with(Name {
                name: "you".to_string(),
                description: "something wearing a borrowed face".to_string(),
            })
            .with(Actor { move_speed: 1 })
            .with(Vitality::new(PLAYER_HP))
            .with(BlocksTile)
            .with(StatusEffects::default())
            .with(Brain::new(Strategy::Player))
            .with(PlayerTag)
            .build()
    }

    /// Spawn an actor from a template onto `map`'s floor. Civilians get a
    /// unique name and a schedule over the map's quarters.
    pub fn spawn_monster(
        &mut self,
        template: &MonsterTemplate,
        point: Point,
        map: &GameMap,
        rng: &mut RandomNumberGenerator,
    ) -> Entity {
        let name = match template.name {
            Some(name) => name.to_string(),
            None => self.unique_name(rng),
        };
        let glyph = template
            .glyph
            .or_else(|| name.chars().next())
            .unwrap_or('?');
        let strategy = match template.temperament {
            Temperament::Hostile => Strategy::Hostile(Default::default()),
            Temperament::Civilian => Strategy::DefaultNpc(Default::default()),
            Temperament::Statue => Strategy::Statue,
        };

        let mut builder = self
            .specs_world
            .create_entity()
            .with(Position {
                point,
                floor: map.floor,
            })
            .with(Renderable {
                glyph,
                color: template.color,
                order: 1,
            })
            .with(Name {
                name,
                description: template.description.to_string(),
            })
            .with(Actor {
                move_speed: template.move_speed,
            })
            .with(Vitality::new(template.hp))
            .with(BlocksTile)
            .with(StatusEffects::default())
            .with(Brain::new(strategy));
        if template.temperament == Temperament::Civilian {
            builder = builder.with(Routine {
                schedule: random_schedule(map, rng),
                turns_since_relief: rng.range(0, NEED_SPREAD) as u32,
            });
        }
        builder.build()
    }

    fn unique_name(&self, rng: &mut RandomNumberGenerator) -> String {
        let names = self.specs_world.read_component::<Name>();
        let taken: Vec<&str> = names.join().map(|name| name.name.as_str()).collect();
        let free: Vec<&str> = NPC_NAMES
            .iter()
            .copied()
            .filter(|name| !taken.contains(name))
            .collect();
        let pool = if free.is_empty() { &NPC_NAMES[..] } else { &free[..] };
        pool[rng.range(0, pool.len() as i32) as usize].to_string()
    }

    pub fn spawn_item(&mut self, template: &ItemTemplate, point: Point, floor: FloorId) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position { point, floor })
            .with(Renderable {
                glyph: template.glyph,
                color: template.color,
                order: 0,
            })
            .with(Name {
                name: template.name.to_string(),
                description: template.description.to_string(),
            })
            .with(Item {
                template: template.name,
                usable: template.usable,
                unidentified: template.unidentified,
            })
            .build()
    }

    pub fn blocking_points(&self, floor: FloorId) -> Vec<Point> {
        let positions = self.specs_world.read_component::<Position>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        (&positions, &blockers)
            .join()
            .filter(|(pos, _)| pos.floor == floor)
            .map(|(pos, _)| pos.point)
            .collect()
    }

    pub fn blocking_entity_at(&self, floor: FloorId, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        (&entities, &positions, &blockers)
            .join()
            .find(|(_, pos, _)| pos.floor == floor && pos.point == point)
            .map(|(entity, _, _)| entity)
    }

    /// Living actors only; remains do not count.
    pub fn actor_at(&self, floor: FloorId, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let actors = self.specs_world.read_component::<Actor>();
        let vitality = self.specs_world.read_component::<Vitality>();
        (&entities, &positions, &actors, &vitality)
            .join()
            .find(|(_, pos, _, vit)| pos.floor == floor && pos.point == point && vit.is_alive())
            .map(|(entity, _, _, _)| entity)
    }

    pub fn item_at(&self, floor: FloorId, point: Point) -> Option<Entity> {
        self.items_at(floor, point).into_iter().next()
    }

    /// Items lying on the floor at `point`, in entity order.
    pub fn items_at(&self, floor: FloorId, point: Point) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let items = self.specs_world.read_component::<Item>();
        (&entities, &positions, &items)
            .join()
            .filter(|(_, pos, _)| pos.floor == floor && pos.point == point)
            .map(|(entity, _, _)| entity)
            .collect()
    }

    pub fn items_on(&self, floor: FloorId) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let items = self.specs_world.read_component::<Item>();
        (&entities, &positions, &items)
            .join()
            .filter(|(_, pos, _)| pos.floor == floor)
            .map(|(entity, _, _)| entity)
            .collect()
    }

    /// Living actors on `floor`, player included, in ascending entity id.
    pub fn living_actors(&self, floor: FloorId) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let actors = self.specs_world.read_component::<Actor>();
        let vitality = self.specs_world.read_component::<Vitality>();
        let mut found: Vec<Entity> = (&entities, &positions, &actors, &vitality)
            .join()
            .filter(|(_, pos, _, vit)| pos.floor == floor && vit.is_alive())
            .map(|(entity, _, _, _)| entity)
            .collect();
        found.sort_by_key(|entity| entity.id());
        found
    }

    pub fn position(&self, entity: Entity) -> Option<Point> {
        let positions = self.specs_world.read_component::<Position>();
        positions.get(entity).map(|pos| pos.point)
    }

    pub fn set_position(&mut self, entity: Entity, point: Point) {
        let mut positions = self.specs_world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(entity) {
            pos.point = point;
        }
    }

    pub fn name(&self, entity: Entity) -> String {
        let names = self.specs_world.read_component::<Name>();
        names
            .get(entity)
            .map(|name| name.name.clone())
            .unwrap_or_else(|| "something".to_string())
    }

    pub fn description(&self, entity: Entity) -> String {
        let names = self.specs_world.read_component::<Name>();
        names
            .get(entity)
            .map(|name| name.description.clone())
            .unwrap_or_default()
    }

    pub fn is_player(&self, entity: Entity) -> bool {
        entity == self.player
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        if !self.specs_world.is_alive(entity) {
            return false;
        }
        let vitality = self.specs_world.read_component::<Vitality>();
        vitality.get(entity).is_some_and(Vitality::is_alive)
    }

    pub fn move_speed(&self, entity: Entity) -> i32 {
        let actors = self.specs_world.read_component::<Actor>();
        actors.get(entity).map_or(0, |actor| actor.move_speed)
    }

    pub fn vitality(&self, entity: Entity) -> Option<Vitality> {
        let vitality = self.specs_world.read_component::<Vitality>();
        vitality.get(entity).cloned()
    }

    /// Subtract `amount` hit points and return what is left, or `None` for
    /// entities that cannot be hurt.
    pub fn damage(&mut self, entity: Entity, amount: i32) -> Option<i32> {
        let mut vitality = self.specs_world.write_component::<Vitality>();
        let vit = vitality.get_mut(entity)?;
        vit.hp -= amount;
        Some(vit.hp)
    }

    /// Turn the player into a corpse that stays on the map.
    pub fn mark_player_dead(&mut self, cause: &str) {
        let player = self.player;
        {
            let mut vitality = self.specs_world.write_component::<Vitality>();
            if let Some(vit) = vitality.get_mut(player) {
                vit.hp = vit.hp.min(0);
                vit.cause_of_death = Some(cause.to_string());
            }
        }
        {
            let mut names = self.specs_world.write_component::<Name>();
            if let Some(name) = names.get_mut(player) {
                name.name = format!("remains of {}", name.name);
            }
        }
        {
            let mut renderables = self.specs_world.write_component::<Renderable>();
            if let Some(render) = renderables.get_mut(player) {
                render.glyph = '%';
                render.color = RGB::from_u8(191, 0, 0);
                render.order = 0;
            }
        }
        self.remove_brain(player);
    }

    pub fn brain(&self, entity: Entity) -> Option<Brain> {
        let brains = self.specs_world.read_component::<Brain>();
        brains.get(entity).cloned()
    }

    pub fn set_brain(&mut self, entity: Entity, brain: Brain) {
        let mut brains = self.specs_world.write_component::<Brain>();
        warn_on_stale(brains.insert(entity, brain), "brain");
    }

    pub fn remove_brain(&mut self, entity: Entity) {
        let mut brains = self.specs_world.write_component::<Brain>();
        brains.remove(entity);
    }

    /// Current strategy's label, for inspection.
    pub fn brain_description(&self, entity: Entity) -> Option<&'static str> {
        let brains = self.specs_world.read_component::<Brain>();
        brains.get(entity).map(Brain::description)
    }

    pub fn has_status(&self, entity: Entity, kind: StatusKind) -> bool {
        let statuses = self.specs_world.read_component::<StatusEffects>();
        statuses.get(entity).is_some_and(|status| status.has(kind))
    }

    pub fn apply_status(&mut self, entity: Entity, kind: StatusKind, duration: i32) {
        let mut statuses = self.specs_world.write_component::<StatusEffects>();
        if let Some(status) = statuses.get_mut(entity) {
            status.apply(kind, duration);
        } else {
            let mut status = StatusEffects::default();
            status.apply(kind, duration);
            warn_on_stale(statuses.insert(entity, status), "status");
        }
    }

    pub fn remove_status(&mut self, entity: Entity, kind: StatusKind) {
        let mut statuses = self.specs_world.write_component::<StatusEffects>();
        if let Some(status) = statuses.get_mut(entity) {
            status.remove(kind);
        }
    }

    pub fn routine(&self, entity: Entity) -> Option<Routine> {
        let routines = self.specs_world.read_component::<Routine>();
        routines.get(entity).cloned()
    }

    pub fn set_routine(&mut self, entity: Entity, routine: Routine) {
        let mut routines = self.specs_world.write_component::<Routine>();
        warn_on_stale(routines.insert(entity, routine), "routine");
    }

    pub fn reset_need_timer(&mut self, entity: Entity) {
        let mut routines = self.specs_world.write_component::<Routine>();
        if let Some(routine) = routines.get_mut(entity) {
            routine.turns_since_relief = 0;
        }
    }

    pub fn item(&self, entity: Entity) -> Option<Item> {
        let items = self.specs_world.read_component::<Item>();
        items.get(entity).cloned()
    }

    /// The name an item goes by: the real one once its template is known.
    pub fn item_label(&self, entity: Entity) -> String {
        let Some(item) = self.item(entity) else {
            return self.name(entity);
        };
        if self.is_identified(item.template) {
            item.template.to_string()
        } else {
            item.unidentified.to_string()
        }
    }

    /// Carried items in pickup order.
    pub fn inventory(&self, owner: Entity) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let packed = self.specs_world.read_component::<InBackpack>();
        let mut carried: Vec<(u64, Entity)> = (&entities, &packed)
            .join()
            .filter(|(_, pack)| pack.owner == owner)
            .map(|(entity, pack)| (pack.order, entity))
            .collect();
        carried.sort_by_key(|(order, _)| *order);
        carried.into_iter().map(|(_, entity)| entity).collect()
    }

    pub fn is_carried(&self, item: Entity) -> bool {
        let packed = self.specs_world.read_component::<InBackpack>();
        packed.contains(item)
    }

    /// Move an item off the map into `owner`'s backpack.
    pub fn stow(&mut self, owner: Entity, item: Entity) {
        self.pickups += 1;
        let order = self.pickups;
        {
            let mut positions = self.specs_world.write_component::<Position>();
            positions.remove(item);
        }
        let mut packed = self.specs_world.write_component::<InBackpack>();
        warn_on_stale(packed.insert(item, InBackpack { owner, order }), "backpack");
    }

    pub fn drop_item(&mut self, item: Entity, point: Point, floor: FloorId) {
        {
            let mut packed = self.specs_world.write_component::<InBackpack>();
            packed.remove(item);
        }
        let mut positions = self.specs_world.write_component::<Position>();
        warn_on_stale(positions.insert(item, Position { point, floor }), "position");
    }

    pub fn despawn(&mut self, entity: Entity) {
        warn_on_stale(self.specs_world.delete_entity(entity), "despawn");
    }

    /// Delete everything standing on `floor` except the player. Carried items
    /// have no position and survive.
    pub fn clear_floor(&mut self, floor: FloorId) {
        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let positions = self.specs_world.read_component::<Position>();
            (&entities, &positions)
                .join()
                .filter(|(entity, pos)| pos.floor == floor && *entity != self.player)
                .map(|(entity, _)| entity)
                .collect()
        };
        debug!(floor = floor.0, count = doomed.len(), "clearing floor");
        for entity in doomed {
            warn_on_stale(self.specs_world.delete_entity(entity), "despawn");
        }
        self.specs_world.maintain();
    }

    pub fn move_player_to(&mut self, point: Point, floor: FloorId) {
        let mut positions = self.specs_world.write_component::<Position>();
        warn_on_stale(positions.insert(self.player, Position { point, floor }), "player position");
    }

    pub fn is_identified(&self, template: &str) -> bool {
        self.specs_world.read_resource::<ItemKnowledge>().is_known(template)
    }

    /// Returns true if the template was not known before.
    pub fn identify(&self, template: &'static str) -> bool {
        self.specs_world.write_resource::<ItemKnowledge>().learn(template)
    }

    pub fn log<S: Into<String>>(&self, text: S) {
        self.specs_world.write_resource::<MessageLog>().push(text);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.specs_world.read_resource::<MessageLog>().entries.clone()
    }

    pub fn last_message(&self) -> Option<String> {
        self.specs_world
            .read_resource::<MessageLog>()
            .last()
            .map(str::to_string)
    }

    pub fn has_message(&self, text: &str) -> bool {
        self.specs_world.read_resource::<MessageLog>().contains(text)
    }

    pub fn record<S: Into<String>>(&self, kind: EventKind, subject: S) {
        self.specs_world
            .write_resource::<History>()
            .record(kind, subject, self.turn);
    }

    pub fn history(&self) -> Vec<HistoryEvent> {
        self.specs_world.read_resource::<History>().events.clone()
    }

    pub fn history_count(&self, kind: EventKind) -> usize {
        self.specs_world.read_resource::<History>().count(kind)
    }

    /// End-of-turn bookkeeping: statuses wear off, needs grow, the clock ticks.
    pub fn tick(&mut self) {
        self.dispatcher.dispatch(&mut self.specs_world);
        self.specs_world.maintain();
        self.turn = self.turn.wrapping_add(1);
        self.specs_world.write_resource::<MessageLog>().turn = self.turn;
    }

    pub fn each_renderable<F>(&self, floor: FloorId, mut f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut drawn: Vec<(Point, &Renderable)> = (&positions, &renderables)
            .join()
            .filter(|(pos, _)| pos.floor == floor)
            .map(|(pos, render)| (pos.point, render))
            .collect();
        drawn.sort_by_key(|(_, render)| render.order);
        for (point, render) in drawn {
            f(point, render);
        }
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn player_point(&self) -> Point {
        self.position(self.player).unwrap_or(Point::new(0, 0))
    }

    pub fn player_alive(&self) -> bool {
        self.is_alive(self.player)
    }
}

/// One quarters room per time block, distinct while there are enough of them.
fn random_schedule(map: &GameMap, rng: &mut RandomNumberGenerator) -> Vec<(u32, usize)> {
    let mut quarters: Vec<usize> = map
        .rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| room.kind == RoomKind::Quarters)
        .map(|(idx, _)| idx)
        .collect();
    if quarters.is_empty() {
        return Vec::new();
    }
    let all = quarters.clone();
    let mut schedule = Vec::new();
    for hour in SCHEDULE_BLOCKS {
        if quarters.is_empty() {
            quarters = all.clone();
        }
        let pick = rng.range(0, quarters.len() as i32) as usize;
        schedule.push((hour, quarters.swap_remove(pick)));
    }
    schedule
}

/// Storage writes only fail for an entity whose generation has moved on;
/// the write is dropped and noted.
fn warn_on_stale<T, E: std::fmt::Display>(result: Result<T, E>, what: &'static str) {
    if let Err(err) = result {
        warn!(%err, what, "entity storage update skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::items::Usable,
        map::{RoomArea, tests::room_map},
    };
    use bracket_geometry::prelude::Rect;

    fn world() -> (GameMap, EcsWorld, RandomNumberGenerator) {
        let mut map = room_map(20, 20, 1, 1, 18, 18);
        for (idx, kind) in [RoomKind::Hall, RoomKind::Quarters, RoomKind::Quarters, RoomKind::Restroom]
            .into_iter()
            .enumerate()
        {
            let x = 1 + idx as i32 * 4;
            map.rooms.push(RoomArea {
                name: format!("room {idx}"),
                kind,
                interior: Rect::with_exact(x, 1, x + 3, 4),
            });
        }
        let ecs = EcsWorld::new(Point::new(2, 2), FloorId(1));
        (map, ecs, RandomNumberGenerator::seeded(11))
    }

    #[test]
    fn civilians_get_unique_names_and_a_schedule() {
        let (map, mut ecs, mut rng) = world();
        let a = ecs.spawn_monster(&MonsterTemplate::civilian(), Point::new(5, 5), &map, &mut rng);
        let b = ecs.spawn_monster(&MonsterTemplate::civilian(), Point::new(6, 5), &map, &mut rng);
        assert_ne!(ecs.name(a), ecs.name(b));

        let routine = ecs.routine(a).expect("civilians follow a routine");
        assert_eq!(routine.schedule.len(), 4);
        assert!(
            routine
                .schedule
                .iter()
                .all(|(_, room)| map.rooms[*room].kind == RoomKind::Quarters)
        );
        assert!(routine.turns_since_relief < 240);

        let guard = ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(7, 5), &map, &mut rng);
        assert!(ecs.routine(guard).is_none());
        assert_eq!(ecs.brain_description(guard), Some("asleep"));
    }

    #[test]
    fn pickup_moves_ownership_not_copies() {
        let (_, mut ecs, _) = world();
        let player = ecs.player_entity();
        let rock = ecs.spawn_item(&ItemTemplate::rock(), Point::new(2, 2), FloorId(1));
        assert_eq!(ecs.item_at(FloorId(1), Point::new(2, 2)), Some(rock));

        ecs.stow(player, rock);
        assert!(ecs.item_at(FloorId(1), Point::new(2, 2)).is_none());
        assert_eq!(ecs.inventory(player), vec![rock]);
        assert_eq!(
            ecs.item(rock).map(|item| item.usable),
            Some(Usable::Projectile { damage: 1 })
        );

        ecs.drop_item(rock, Point::new(3, 3), FloorId(1));
        assert!(ecs.inventory(player).is_empty());
        assert_eq!(ecs.item_at(FloorId(1), Point::new(3, 3)), Some(rock));
    }

    #[test]
    fn clearing_a_floor_keeps_player_and_backpack() {
        let (map, mut ecs, mut rng) = world();
        let player = ecs.player_entity();
        let npc = ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(5, 5), &map, &mut rng);
        let carried = ecs.spawn_item(&ItemTemplate::rock(), Point::new(2, 2), FloorId(1));
        let left = ecs.spawn_item(&ItemTemplate::rock(), Point::new(9, 9), FloorId(1));
        ecs.stow(player, carried);

        ecs.clear_floor(FloorId(1));
        assert!(ecs.is_alive(player));
        assert!(!ecs.is_alive(npc));
        assert!(ecs.item(left).is_none());
        assert_eq!(ecs.inventory(player), vec![carried]);
    }

    #[test]
    fn living_actors_are_sorted_and_exclude_dead() {
        let (map, mut ecs, mut rng) = world();
        let a = ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(5, 5), &map, &mut rng);
        let b = ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(6, 6), &map, &mut rng);
        assert_eq!(ecs.living_actors(FloorId(1)), vec![ecs.player_entity(), a, b]);

        ecs.damage(a, 10);
        assert_eq!(ecs.living_actors(FloorId(1)), vec![ecs.player_entity(), b]);
        assert!(ecs.actor_at(FloorId(1), Point::new(5, 5)).is_none());
        assert!(ecs.living_actors(FloorId(2)).is_empty());
    }

    #[test]
    fn player_remains_stay_on_the_map() {
        let (_, mut ecs, _) = world();
        let player = ecs.player_entity();
        ecs.damage(player, 1);
        ecs.mark_player_dead("security guard");
        assert!(!ecs.player_alive());
        assert_eq!(ecs.name(player), "remains of you");
        assert!(ecs.brain(player).is_none());
        assert_eq!(
            ecs.vitality(player).and_then(|vit| vit.cause_of_death),
            Some("security guard".to_string())
        );
        assert_eq!(ecs.position(player), Some(Point::new(2, 2)));
    }

    #[test]
    fn writes_to_a_despawned_entity_are_dropped() {
        let (map, mut ecs, mut rng) = world();
        let guard = ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(5, 5), &map, &mut rng);
        ecs.despawn(guard);
        ecs.despawn(guard);
        ecs.set_routine(
            guard,
            Routine {
                schedule: Vec::new(),
                turns_since_relief: 0,
            },
        );
        ecs.apply_status(guard, StatusKind::Confused, 3);
        assert!(!ecs.is_alive(guard));
        assert!(ecs.routine(guard).is_none());
        assert!(!ecs.has_status(guard, StatusKind::Confused));
        assert_eq!(ecs.living_actors(FloorId(1)), vec![ecs.player_entity()]);
    }
}
