mod engine;
mod state;
mod term;

use std::process::exit;
use std::time::Duration;

use state::{GameState, HEIGHT, WIDTH};
use term::TermManager;

pub type Coords = (i16, i16);

// The single speed knob: how long one tick may wait for a key.
const TICK_INTERVAL: Duration = Duration::from_millis(150);

fn main() {
    env_logger::init();

    let mut term = TermManager::new();
    // Two text lines go below the board.
    if !term.can_fit(WIDTH, HEIGHT + 2) {
        eprintln!("Terminal too small: the game needs {}x{}.", WIDTH, HEIGHT + 2);
        exit(1);
    }

    term.setup();

    let mut game = GameState::new();
    engine::run(&mut game, &mut term, TICK_INTERVAL);

    log::info!("game over, final score {}", game.score());
    term.show_game_over(&game.snapshot());
    term.restore();
}
