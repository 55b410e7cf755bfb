pub mod items;
pub mod monsters;
pub mod tiles;

/// Layout settings for one floor of the room-and-corridor generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloorParams {
    /// Inclusive range the room count is drawn from.
    pub room_count: (u32, u32),
    /// Inclusive range of room side lengths; target area is the square.
    pub room_size: (i32, i32),
    /// Every room grows off the previous one instead of a random one.
    pub chained: bool,
}

const SMALL: (i32, i32) = (6, 8);
const MEDIUM_SMALL: (i32, i32) = (8, 9);
const LARGE: (i32, i32) = (10, 13);
const VARIED: (i32, i32) = (6, 13);

pub fn floor_params(floor: u32) -> FloorParams {
    let (room_count, room_size) = match floor {
        0 | 1 => ((4, 5), MEDIUM_SMALL),
        2 => ((5, 6), MEDIUM_SMALL),
        3 | 4 => ((6, 7), VARIED),
        5 | 6 => ((5, 6), LARGE),
        7 => ((12, 13), SMALL),
        8 => ((6, 7), LARGE),
        _ => ((8, 9), VARIED),
    };
    FloorParams {
        room_count,
        room_size,
        chained: floor <= 1,
    }
}
