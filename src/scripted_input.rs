//! Keystroke scripts for driving a run without a terminal.
//!
//! One character per command; blank lines and `#` comments are skipped.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use specs::prelude::Entity;
use tracing::warn;

use crate::{actions::Action, ecs::EcsWorld, map::chebyshev};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Step(i32, i32),
    Wait,
    Pickup,
    Descend,
    /// Use the backpack item in this slot on yourself.
    Use(usize),
    /// Throw the first backpack item at the nearest creature in sight.
    Throw,
    /// Bite whoever stands next to you.
    Eat,
    Quit,
}

impl Command {
    /// The action this command stands for, or `None` when it needs something
    /// the player does not have.
    pub fn to_action(self, ecs: &EcsWorld, perceived: &[Entity]) -> Option<Action> {
        let actor = ecs.player_entity();
        match self {
            Command::Step(dx, dy) => Some(Action::Bump { actor, dx, dy }),
            Command::Wait => Some(Action::Wait { actor }),
            Command::Pickup => Some(Action::Pickup { actor }),
            Command::Descend => Some(Action::TakeStairs { actor }),
            Command::Use(slot) => ecs.inventory(actor).get(slot).map(|item| Action::UseItem {
                actor,
                item: *item,
                target: None,
            }),
            Command::Throw => {
                let item = ecs.inventory(actor).first().copied()?;
                let origin = ecs.player_point();
                let target = perceived
                    .iter()
                    .filter_map(|other| ecs.position(*other))
                    .min_by_key(|point| chebyshev(origin, *point))?;
                Some(Action::Throw {
                    actor,
                    item,
                    target,
                })
            }
            Command::Eat => {
                let origin = ecs.player_point();
                let victim = perceived
                    .iter()
                    .filter_map(|other| ecs.position(*other))
                    .find(|point| chebyshev(origin, *point) == 1)?;
                Some(Action::Eat {
                    actor,
                    dx: victim.x - origin.x,
                    dy: victim.y - origin.y,
                })
            }
            Command::Quit => None,
        }
    }
}

pub struct ScriptedInput {
    commands: Vec<Command>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        Ok(Self::parse(lines.iter().map(String::as_str)))
    }

    pub fn parse<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut commands = Vec::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            for key in line.chars() {
                match char_to_command(key) {
                    Some(command) => commands.push(command),
                    None => warn!(%key, "unknown key in script"),
                }
            }
        }
        Self {
            commands,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn next_command(&mut self) -> Option<Command> {
        let command = self.commands.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(command)
    }
}

fn char_to_command(c: char) -> Option<Command> {
    match c {
        'w' | 'W' | 'k' | 'K' => Some(Command::Step(0, -1)),
        's' | 'S' | 'j' | 'J' => Some(Command::Step(0, 1)),
        'a' | 'A' | 'h' | 'H' => Some(Command::Step(-1, 0)),
        'd' | 'D' | 'l' | 'L' => Some(Command::Step(1, 0)),
        'y' | 'Y' => Some(Command::Step(-1, -1)),
        'u' | 'U' => Some(Command::Step(1, -1)),
        'b' | 'B' => Some(Command::Step(-1, 1)),
        'n' | 'N' => Some(Command::Step(1, 1)),
        '.' => Some(Command::Wait),
        'g' | 'G' | ',' => Some(Command::Pickup),
        '>' => Some(Command::Descend),
        '1'..='9' => c.to_digit(10).map(|digit| Command::Use(digit as usize - 1)),
        't' | 'T' => Some(Command::Throw),
        'e' | 'E' => Some(Command::Eat),
        'q' | 'Q' | '\x1B' => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::items::ItemTemplate, map::FloorId};
    use bracket_geometry::prelude::Point;
    use std::io::Write;

    #[test]
    fn comments_and_unknown_keys_are_skipped() {
        let mut script = ScriptedInput::parse(["# opening moves", "", "hjz.", "  >q  "]);
        assert_eq!(script.len(), 5);
        assert_eq!(script.next_command(), Some(Command::Step(-1, 0)));
        assert_eq!(script.next_command(), Some(Command::Step(0, 1)));
        assert_eq!(script.next_command(), Some(Command::Wait));
        assert_eq!(script.next_command(), Some(Command::Descend));
        assert_eq!(script.next_command(), Some(Command::Quit));
        assert_eq!(script.next_command(), None);
    }

    #[test]
    fn reads_scripts_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "g1").unwrap();
        let mut script = ScriptedInput::from_file(file.path()).unwrap();
        assert_eq!(script.next_command(), Some(Command::Pickup));
        assert_eq!(script.next_command(), Some(Command::Use(0)));
    }

    #[test]
    fn item_commands_need_items() {
        let mut ecs = EcsWorld::new(Point::new(3, 3), FloorId(1));
        assert_eq!(Command::Use(0).to_action(&ecs, &[]), None);
        assert_eq!(Command::Throw.to_action(&ecs, &[]), None);

        let player = ecs.player_entity();
        let rock = ecs.spawn_item(&ItemTemplate::rock(), Point::new(3, 3), FloorId(1));
        ecs.stow(player, rock);
        assert_eq!(
            Command::Use(0).to_action(&ecs, &[]),
            Some(Action::UseItem {
                actor: player,
                item: rock,
                target: None
            })
        );
        // Nobody in sight to throw at.
        assert_eq!(Command::Throw.to_action(&ecs, &[]), None);
    }

    #[test]
    fn eating_needs_a_neighbor() {
        let map = crate::map::tests::room_map(10, 10, 1, 1, 8, 8);
        let mut ecs = EcsWorld::new(Point::new(3, 3), FloorId(1));
        let mut rng = bracket_random::prelude::RandomNumberGenerator::seeded(1);
        let far = ecs.spawn_monster(
            &crate::data::monsters::MonsterTemplate::civilian(),
            Point::new(7, 7),
            &map,
            &mut rng,
        );
        assert_eq!(Command::Eat.to_action(&ecs, &[far]), None);

        let near = ecs.spawn_monster(
            &crate::data::monsters::MonsterTemplate::civilian(),
            Point::new(2, 4),
            &map,
            &mut rng,
        );
        assert_eq!(
            Command::Eat.to_action(&ecs, &[far, near]),
            Some(Action::Eat {
                actor: ecs.player_entity(),
                dx: -1,
                dy: 1
            })
        );
    }
}
