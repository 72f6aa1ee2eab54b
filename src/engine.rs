use std::time::Duration;

use crate::state::{inside_walls, Direction, GameState, GameStatus, Notice, Snapshot, FRUIT_REWARD, MAX_BODY_LEN};

/// One abstract key symbol. The terminal layer maps physical keys to these;
/// the engine never sees key codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Move(Direction),
    Quit,
    Unrecognized,
}

/// Non-blocking input: yields at most one pending key, waiting no longer
/// than `timeout` so the tick cadence holds even with idle hands.
pub trait KeySource {
    fn poll_key(&mut self, timeout: Duration) -> Option<Key>;
}

/// Output sink: receives one snapshot per tick and owns all drawing.
pub trait RenderSurface {
    fn draw(&mut self, frame: &Snapshot);
}

/// Advances the simulation by exactly one step. A terminated game is frozen:
/// further ticks leave every field untouched.
pub fn tick(state: &mut GameState, key: Option<Key>) -> GameStatus {
    if state.status == GameStatus::Terminated {
        return state.status;
    }

    state.notice = None;

    match key {
        Some(Key::Quit) => {
            state.status = GameStatus::Terminated;
            return state.status;
        }
        Some(Key::Move(dir)) => state.set_direction(dir),
        Some(Key::Unrecognized) | None => {}
    }

    let dir = match state.heading {
        Some(d) => d,
        None => return state.status, // nothing moves until the first steer
    };

    let prev_head = state.head;
    let new_head = dir.offset(prev_head);

    // The head is committed even when the move is fatal, so the final frame
    // shows the collision cell.
    state.head = new_head;

    if !inside_walls(new_head) || state.body.contains(&new_head) {
        state.status = GameStatus::Terminated;
        return state.status;
    }

    let mut grew = false;
    if new_head == state.fruit {
        state.score += FRUIT_REWARD;
        if state.body.len() < MAX_BODY_LEN {
            grew = true;
        } else {
            state.notice = Some(Notice::MaxLength);
        }
        state.place_fruit();
        if state.status == GameStatus::Terminated {
            return state.status;
        }
    }

    // Every segment trails the one before it by a tick: the vacated head
    // cell becomes segment 0 and, unless the snake grew, the tail cell is
    // given up.
    state.body.push_front(prev_head);
    if !grew {
        state.body.pop_back();
    }

    state.status
}

/// Runs the fixed-cadence loop until the game terminates: draw the current
/// frame, wait up to one tick interval for a key, step the simulation.
pub fn run<T>(state: &mut GameState, io: &mut T, interval: Duration)
where
    T: KeySource + RenderSurface,
{
    while state.status() == GameStatus::Running {
        io.draw(&state.snapshot());
        let key = io.poll_key(interval);
        tick(state, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{HEIGHT, WIDTH};
    use proptest::prelude::*;
    use std::collections::VecDeque;

    // A fixed heading with the fruit parked out of the way, so movement can
    // be observed in isolation.
    fn rolling_state(head: (i16, i16), dir: Direction) -> GameState {
        let mut state = GameState::with_seed(42);
        state.head = head;
        state.set_direction(dir);
        state.fruit = if head.1 == 1 { (1, 2) } else { (1, 1) };
        state
    }

    #[test]
    fn nothing_moves_before_the_first_steer() {
        let mut state = GameState::with_seed(5);
        let status = tick(&mut state, None);

        assert_eq!(status, GameStatus::Running);
        assert_eq!(state.head, (WIDTH / 2, HEIGHT / 2));
        assert!(state.body.is_empty());
    }

    #[test]
    fn plain_move_advances_the_head_one_cell() {
        let mut state = rolling_state((20, 10), Direction::Right);
        let status = tick(&mut state, None);

        assert_eq!(status, GameStatus::Running);
        assert_eq!(state.head, (21, 10));
        assert!(state.body.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn a_steer_takes_effect_on_the_same_tick() {
        let mut state = rolling_state((20, 10), Direction::Right);
        tick(&mut state, Some(Key::Move(Direction::Down)));

        assert_eq!(state.head, (20, 11));
    }

    #[test]
    fn unrecognized_keys_change_nothing_about_the_course() {
        let mut state = rolling_state((20, 10), Direction::Right);
        tick(&mut state, Some(Key::Unrecognized));

        assert_eq!(state.head, (21, 10));
        assert_eq!(state.status, GameStatus::Running);
    }

    #[test]
    fn eating_a_fruit_scores_grows_and_relocates() {
        let mut state = rolling_state((20, 10), Direction::Right);
        state.fruit = (21, 10);

        let status = tick(&mut state, None);

        assert_eq!(status, GameStatus::Running);
        assert_eq!(state.head, (21, 10));
        assert_eq!(state.score, FRUIT_REWARD);
        assert_eq!(state.body.len(), 1);
        assert_eq!(state.body[0], (20, 10));
        assert_ne!(state.fruit, state.head);
        assert!(inside_walls(state.fruit));
    }

    #[test]
    fn growth_stops_at_the_cap_but_scoring_does_not() {
        let mut state = rolling_state((20, 10), Direction::Right);
        // A full-length body parked away from the head's path.
        state.body = (0..MAX_BODY_LEN)
            .map(|i| (1 + (i as i16) % 30, 1 + (i as i16) / 30))
            .collect();
        state.fruit = (21, 10);

        tick(&mut state, None);

        assert_eq!(state.score, FRUIT_REWARD);
        assert_eq!(state.body.len(), MAX_BODY_LEN);
        assert_eq!(state.body[0], (20, 10));
        assert_eq!(state.notice, Some(Notice::MaxLength));
    }

    #[test]
    fn hitting_the_wall_ends_the_game_on_the_fatal_frame() {
        let mut state = rolling_state((1, 10), Direction::Left);
        let status = tick(&mut state, None);

        assert_eq!(status, GameStatus::Terminated);
        assert_eq!(state.head, (0, 10));
    }

    #[test]
    fn biting_the_tail_ends_the_game_at_the_colliding_cell() {
        let mut state = rolling_state((20, 10), Direction::Right);
        state.body = VecDeque::from(vec![(20, 11), (21, 11), (21, 10)]);

        let status = tick(&mut state, None);

        assert_eq!(status, GameStatus::Terminated);
        assert_eq!(state.head, (21, 10));
    }

    #[test]
    fn quit_terminates_without_physics() {
        let mut state = rolling_state((20, 10), Direction::Right);
        let status = tick(&mut state, Some(Key::Quit));

        assert_eq!(status, GameStatus::Terminated);
        assert_eq!(state.head, (20, 10));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn a_terminated_game_is_frozen() {
        let mut state = rolling_state((1, 10), Direction::Left);
        tick(&mut state, None);
        assert_eq!(state.status, GameStatus::Terminated);

        let head = state.head;
        let body = state.body.clone();
        let fruit = state.fruit;
        let score = state.score;

        for key in vec![None, Some(Key::Move(Direction::Right)), Some(Key::Quit)] {
            tick(&mut state, key);
            assert_eq!(state.head, head);
            assert_eq!(state.body, body);
            assert_eq!(state.fruit, fruit);
            assert_eq!(state.score, score);
        }
    }

    // Scripted stand-in for the terminal: replays a key sequence and counts
    // the frames it gets handed.
    struct ScriptedIo {
        keys: VecDeque<Option<Key>>,
        frames: usize,
    }

    impl KeySource for ScriptedIo {
        fn poll_key(&mut self, _timeout: Duration) -> Option<Key> {
            self.keys.pop_front().flatten()
        }
    }

    impl RenderSurface for ScriptedIo {
        fn draw(&mut self, _frame: &Snapshot) {
            self.frames += 1;
        }
    }

    #[test]
    fn run_drives_the_loop_until_the_wall() {
        let mut state = GameState::with_seed(11);
        let mut io = ScriptedIo {
            keys: VecDeque::from(vec![Some(Key::Move(Direction::Left))]),
            frames: 0,
        };

        run(&mut state, &mut io, Duration::from_millis(0));

        assert_eq!(state.status(), GameStatus::Terminated);
        assert_eq!(state.head.0, 0);
        // From x=20, twenty left moves reach the wall; one frame per tick.
        assert_eq!(io.frames, 20);
    }

    fn key_strategy() -> impl Strategy<Value = Option<Key>> {
        prop_oneof![
            Just(None),
            Just(Some(Key::Unrecognized)),
            Just(Some(Key::Move(Direction::Up))),
            Just(Some(Key::Move(Direction::Down))),
            Just(Some(Key::Move(Direction::Left))),
            Just(Some(Key::Move(Direction::Right))),
        ]
    }

    proptest! {
        #[test]
        fn live_states_never_overlap_or_leave_the_board(
            seed in any::<u64>(),
            keys in proptest::collection::vec(key_strategy(), 0..200),
        ) {
            let mut state = GameState::with_seed(seed);

            for key in keys {
                tick(&mut state, key);
                if state.status() != GameStatus::Running {
                    break;
                }

                prop_assert!(inside_walls(state.head));
                for (i, cell) in state.body.iter().enumerate() {
                    prop_assert!(inside_walls(*cell));
                    prop_assert_ne!(*cell, state.head);
                    for other in state.body.iter().skip(i + 1) {
                        prop_assert_ne!(cell, other);
                    }
                }
                prop_assert_ne!(state.fruit, state.head);
                prop_assert!(inside_walls(state.fruit));
            }
        }
    }
}
