use std::collections::VecDeque;

use crate::Coords;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const WIDTH: i16 = 40;
pub const HEIGHT: i16 = 20;
pub const MAX_BODY_LEN: usize = 100;
pub const FRUIT_REWARD: u32 = 10;

// Way more samples than the board has cells. If every one of them lands on
// the snake, the free cells have effectively run out.
const FRUIT_PLACEMENT_ATTEMPTS: u32 = 10 * (WIDTH as u32) * (HEIGHT as u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    Terminated,
}

/// Render hint for abnormal-but-not-fatal conditions, carried on the
/// snapshot instead of an error. The surface decides the wording.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    MaxLength,
    BoardFull,
}

/// Read-only view of one frame, handed to the render surface once per tick.
pub struct Snapshot<'a> {
    pub width: i16,
    pub height: i16,
    pub head: Coords,
    pub body: &'a VecDeque<Coords>,
    pub fruit: Coords,
    pub score: u32,
    pub status: GameStatus,
    pub notice: Option<Notice>,
}

/// The whole mutable game aggregate. Only the tick engine writes to it;
/// everyone else sees a `Snapshot`.
pub struct GameState {
    pub(crate) head: Coords,
    pub(crate) body: VecDeque<Coords>,
    pub(crate) fruit: Coords,
    pub(crate) score: u32,
    pub(crate) heading: Option<Direction>,
    pub(crate) status: GameStatus,
    pub(crate) notice: Option<Notice>,
    rng: StdRng,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn offset(self, (x, y): Coords) -> Coords {
        match self {
            Direction::Up => (x, y - 1),
            Direction::Down => (x, y + 1),
            Direction::Left => (x - 1, y),
            Direction::Right => (x + 1, y),
        }
    }
}

/// The playable region is the open rectangle inside the 1-cell wall border.
pub(crate) fn inside_walls((x, y): Coords) -> bool {
    x >= 1 && x <= WIDTH - 2 && y >= 1 && y <= HEIGHT - 2
}

impl GameState {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic variant, used by the tests.
    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        let mut state = GameState {
            head: (0, 0),
            body: VecDeque::new(),
            fruit: (0, 0),
            score: 0,
            heading: None,
            status: GameStatus::Running,
            notice: None,
            rng,
        };
        state.initialize();
        state
    }

    pub fn initialize(&mut self) {
        self.score = 0;
        self.status = GameStatus::Running;
        self.heading = None;
        self.head = (WIDTH / 2, HEIGHT / 2);
        self.body.clear();
        self.notice = None;
        self.place_fruit();
    }

    /// Resamples uniformly inside the walls until the candidate misses the
    /// snake. The retry loop is bounded: if the budget runs out the board is
    /// treated as full and the game ends instead of spinning forever.
    pub(crate) fn place_fruit(&mut self) {
        for _ in 0..FRUIT_PLACEMENT_ATTEMPTS {
            let candidate = (
                self.rng.gen_range(1..WIDTH - 1),
                self.rng.gen_range(1..HEIGHT - 1),
            );
            if candidate != self.head && !self.body.contains(&candidate) {
                self.fruit = candidate;
                return;
            }
        }

        log::debug!("no free cell left for the fruit, ending the game");
        self.notice = Some(Notice::BoardFull);
        self.status = GameStatus::Terminated;
    }

    /// Applies a steering request unless it would reverse travel by 180°.
    /// Before the first move any direction is accepted.
    pub fn set_direction(&mut self, requested: Direction) {
        match self.heading {
            Some(current) if requested == current.opposite() => {}
            _ => self.heading = Some(requested),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            width: WIDTH,
            height: HEIGHT,
            head: self.head,
            body: &self.body,
            fruit: self.fruit,
            score: self.score,
            status: self.status,
            notice: self.notice,
        }
    }
}
