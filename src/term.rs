use crate::engine::{Key, KeySource, RenderSurface};
use crate::state::{Direction, GameStatus, Notice, Snapshot};
use crate::Coords;

use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};

const WALL_CHAR: char = '#';
const HEAD_CHAR: char = 'O';
const BODY_CHAR: char = 'o';
const FRUIT_CHAR: char = '*';
const DEAD_CHAR: char = 'X';

pub struct TermManager {
    term_width: u16,
    term_height: u16,
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> Self {
        let (term_width, term_height) = terminal::size().expect("Error reading size.");
        TermManager { term_width, term_height, stdout: stdout() }
    }

    /// Whether the terminal has room for the board plus the text lines
    /// below it.
    pub fn can_fit(&self, width: i16, height: i16) -> bool {
        self.term_width >= width as u16 && self.term_height >= height as u16
    }

    pub fn setup(&mut self) {
        execute!(self.stdout, EnterAlternateScreen).expect("Error entering alt screen");
        self.set_raw_mode(true);
        self.set_cursor_visibility(false);
    }

    pub fn restore(&mut self) {
        self.set_raw_mode(false);
        self.set_cursor_visibility(true);
        execute!(self.stdout, LeaveAlternateScreen).expect("Error leaving alt screen");
    }

    pub fn read_key_blocking(&self) -> KeyEvent {
        loop {
            if let Event::Key(ev) = read().unwrap() {
                return ev;
            }
        }
    }

    /// Final screen: the last frame with a game-over banner over it. Blocks
    /// until a key is pressed so the player can read the score.
    pub fn show_game_over(&mut self, frame: &Snapshot) {
        self.draw(frame);

        let (cx, cy) = (frame.width / 2, frame.height / 2);
        self.print_text_at((cx - 5, cy), "GAME OVER!");
        self.print_text_at((cx - 10, cy + 1), &format!("Final Score: {}", frame.score));
        self.print_text_at((cx - 12, cy + 2), "Press any key to exit...");
        self.flush();

        self.read_key_blocking();
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_walls(&mut self, width: i16, height: i16) {
        for x in 0..width {
            self.print_at((x, 0), WALL_CHAR);
            self.print_at((x, height - 1), WALL_CHAR);
        }

        for y in 1..height - 1 {
            self.print_at((0, y), WALL_CHAR);
            self.print_at((width - 1, y), WALL_CHAR);
        }
    }

    fn print_at(&mut self, pos: Coords, ch: char) {
        queue!(self.stdout, cursor::MoveTo(pos.0 as u16, pos.1 as u16), style::Print(ch)).unwrap();
    }

    fn print_text_at(&mut self, pos: Coords, text: &str) {
        queue!(self.stdout, cursor::MoveTo(pos.0 as u16, pos.1 as u16), style::Print(text)).unwrap();
    }

    fn flush(&mut self) {
        self.stdout.flush().expect("Error flushing.");
    }

    fn set_raw_mode(&self, option: bool) {
        let res = if option {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        };

        res.expect("Error setting raw mode.");
    }

    fn set_cursor_visibility(&mut self, option: bool) {
        let res = if option {
            execute!(self.stdout, cursor::Show)
        } else {
            execute!(self.stdout, cursor::Hide)
        };

        res.expect("Error setting cursor visibility.");
    }
}

impl RenderSurface for TermManager {
    fn draw(&mut self, frame: &Snapshot) {
        queue!(self.stdout, terminal::Clear(ClearType::All)).expect("Error clearing.");

        self.draw_walls(frame.width, frame.height);
        self.print_at(frame.fruit, FRUIT_CHAR);

        let (head_ch, body_ch) = match frame.status {
            GameStatus::Running => (HEAD_CHAR, BODY_CHAR),
            GameStatus::Terminated => (DEAD_CHAR, DEAD_CHAR),
        };

        for pos in frame.body {
            self.print_at(*pos, body_ch);
        }
        self.print_at(frame.head, head_ch);

        self.print_text_at((1, frame.height), &format!("Score: {}", frame.score));
        self.print_text_at((1, frame.height + 1), "Use WASD to move, X to quit.");

        if let Some(notice) = frame.notice {
            let text = match notice {
                Notice::MaxLength => "MAX LENGTH!",
                Notice::BoardFull => "BOARD FULL!",
            };
            self.print_text_at((frame.width / 2 - 5, frame.height / 2), text);
        }

        self.flush();
    }
}

impl KeySource for TermManager {
    fn poll_key(&mut self, timeout: Duration) -> Option<Key> {
        if !poll(timeout).expect("Error polling input.") {
            return None;
        }

        match read().expect("Error reading input.") {
            Event::Key(ev) => Some(decode_key(&ev)),
            _ => Some(Key::Unrecognized),
        }
    }
}

fn decode_key(ev: &KeyEvent) -> Key {
    if is_ctrl_c(ev) {
        return Key::Quit;
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Key::Move(Direction::Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Key::Move(Direction::Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Key::Move(Direction::Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Key::Move(Direction::Right),
        KeyCode::Char('x') | KeyCode::Char('X') => Key::Quit,
        _ => Key::Unrecognized,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
