use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

use super::DecisionContext;
use crate::{
    actions::Action,
    map::{
        chebyshev,
        pathing::{CostGrid, compute_fov, compute_path},
    },
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostileState {
    /// Where the player was last seen. Kept after losing sight.
    pub last_target: Option<Point>,
}

fn path_to(ctx: &DecisionContext, origin: Point, destination: Point) -> Vec<Point> {
    let grid = CostGrid::for_route(
        ctx.map,
        ctx.ecs,
        destination,
        false,
        ctx.config.path_penalty,
    );
    compute_path(origin, destination, &grid)
}

/// Hunt the player: chase it while in view, then head for where it was last
/// seen.
pub fn decide(state: &mut HostileState, actor: Entity, ctx: &mut DecisionContext) -> Vec<Action> {
    let wait = vec![Action::Wait { actor }];
    let Some(origin) = ctx.ecs.position(actor) else {
        return wait;
    };

    let fov = compute_fov(
        &ctx.map.transparency_mask(),
        ctx.map.width,
        ctx.map.height,
        origin,
        ctx.config.fov_radius,
    );
    let player_point = ctx.ecs.player_point();
    let sees_player = ctx.ecs.player_alive()
        && ctx
            .map
            .idx(player_point)
            .is_some_and(|idx| fov[idx]);

    let mut target = None;
    if sees_player && !path_to(ctx, origin, player_point).is_empty() {
        if state.last_target.is_none() {
            ctx.ecs
                .log(format!("The {} spotted you!", ctx.ecs.name(actor)));
        }
        state.last_target = Some(player_point);
        target = Some(player_point);
    }
    let Some(destination) = target.or(state.last_target) else {
        return wait;
    };

    if chebyshev(origin, destination) == 1 {
        return vec![Action::Bump {
            actor,
            dx: destination.x - origin.x,
            dy: destination.y - origin.y,
        }];
    }

    let speed = ctx.ecs.move_speed(actor).max(0) as usize;
    let mut intent = Vec::new();
    let mut cursor = origin;
    for step in path_to(ctx, origin, destination).into_iter().take(speed) {
        // Only step somewhere occupied to hit the target itself.
        if !ctx.map.tile_is_walkable(ctx.ecs, step) && Some(step) != target {
            break;
        }
        intent.push(Action::Bump {
            actor,
            dx: step.x - cursor.x,
            dy: step.y - cursor.y,
        });
        cursor = step;
    }

    if intent.is_empty() { wait } else { intent }
}
