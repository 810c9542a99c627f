use crate::env::{Domain, Task};
use crate::error::Result;
use crate::utils::max_set;
use crate::value_table::ActionValueTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn arrow(&self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Right => '→',
            Direction::Down => '↓',
            Direction::Left => '←',
        }
    }
}

/// Rectangular grid with the agent starting at `(0, 0)`; `y` grows upwards.
///
/// Moving into a wall leaves the agent where it is.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: usize,
    height: usize,
    start: Position,
    exit: Position,
    position: Position,
}

impl GridWorld {
    pub fn new(width: usize, height: usize) -> Self {
        let width: usize = width.max(1);
        let height: usize = height.max(1);
        Self::with_exit(width, height, Position::new(width - 1, height - 1))
    }

    pub fn with_exit(width: usize, height: usize, exit: Position) -> Self {
        let start: Position = Position::new(0, 0);
        Self {
            width: width.max(1),
            height: height.max(1),
            start,
            exit,
            position: start,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn exit(&self) -> Position {
        self.exit
    }

    pub fn moved(&self, position: Position, direction: Direction) -> Position {
        match direction {
            Direction::Up => Position::new(position.x, (position.y + 1).min(self.height - 1)),
            Direction::Right => Position::new((position.x + 1).min(self.width - 1), position.y),
            Direction::Down => Position::new(position.x, position.y.saturating_sub(1)),
            Direction::Left => Position::new(position.x.saturating_sub(1), position.y),
        }
    }

    pub fn render(&self) -> String {
        let mut map: String = String::new();
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let here: Position = Position::new(x, y);
                map.push(if here == self.position {
                    '@'
                } else if here == self.exit {
                    'G'
                } else {
                    '_'
                });
            }
            map.push('\n');
        }
        map
    }

    /// Greedy action(s) of every cell as arrows; `.` marks unvisited cells.
    pub fn render_policy(&self, table: &ActionValueTable<Position, Direction>) -> String {
        let mut map: String = String::new();
        for y in (0..self.height).rev() {
            map.push('|');
            for x in 0..self.width {
                let here: Position = Position::new(x, y);
                let best: Vec<Direction> = max_set(
                    table
                        .known_actions(&here)
                        .map(|(direction, value)| (*direction, value)),
                );
                map.push(' ');
                map.push(if here == self.exit {
                    'G'
                } else {
                    Self::policy_symbol(&best)
                });
            }
            map.push_str(" |\n");
        }
        map
    }

    fn policy_symbol(best: &[Direction]) -> char {
        let has = |d: Direction| best.contains(&d);
        match best.len() {
            1 => best[0].arrow(),
            2 if has(Direction::Left) && has(Direction::Right) => '↔',
            2 if has(Direction::Up) && has(Direction::Down) => '↕',
            2 => ' ',
            4 => '*',
            _ => '.',
        }
    }
}

impl Domain for GridWorld {
    type State = Position;
    type Action = Direction;

    fn current_state(&self) -> Position {
        self.position
    }

    fn legal_actions(&self, _state: &Position) -> Vec<Direction> {
        Direction::ALL.to_vec()
    }

    fn apply_action(&mut self, action: &Direction) -> Result<()> {
        self.position = self.moved(self.position, *action);
        Ok(())
    }

    fn reset(&mut self) {
        self.position = self.start;
    }
}

/// Every step costs one until the exit is reached.
#[derive(Debug, Clone, Copy)]
pub struct ReachExit {
    exit: Position,
}

impl ReachExit {
    pub fn new(world: &GridWorld) -> Self {
        Self { exit: world.exit() }
    }
}

impl Task<Position, Direction> for ReachExit {
    fn reward(&self, _state: &Position, _action: &Direction, _next_state: &Position) -> f64 {
        -1.0
    }

    fn is_final(&self, state: &Position) -> bool {
        *state == self.exit
    }
}
