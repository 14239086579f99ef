//! Terminal front end.
//! Reads button presses from stdin, forwards them to the exercise and draws the buttons
//! with their current marks.

use std::{
    io::{self, BufRead},
    str::FromStr,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossbeam::{
    channel::{self, Receiver},
    select,
};
use crossterm::style::Stylize;
use log::{debug, warn};

use crate::{
    audio::{
        devices::OutputStream,
        player::Player,
        sequence::{PlaybackEvent, PlaybackState},
    },
    checker::{Marks, Verdict},
    exercises::{Button, Exercise, Response},
};

/// How often expired marks are looked for.
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Help,
    Quit,
    Press(Button),
    Unknown(String),
}

pub struct Console {
    exercise: Box<dyn Exercise>,
    player: Player,
    output: OutputStream,
    events: Receiver<PlaybackEvent>,
    marks: Marks,
}

impl Console {
    pub fn new(
        exercise: Box<dyn Exercise>,
        player: Player,
        output: OutputStream,
        events: Receiver<PlaybackEvent>,
    ) -> Self {
        Self {
            exercise,
            player,
            output,
            events,
            marks: Marks::new(),
        }
    }

    /// Runs until the user quits or stdin closes.
    pub fn run(mut self) -> Result<()> {
        let lines = spawn_stdin();
        let events = self.events.clone();

        self.help();
        self.render();

        loop {
            select! {
                recv(lines) -> line => match line {
                    Ok(line) => {
                        if !self.handle_line(&line)? {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                recv(events) -> event => {
                    if let Ok(event) = event {
                        self.on_event(event);
                    }
                },
                default(TICK) => {
                    if self.marks.prune(Instant::now()) {
                        self.render();
                    }
                },
            }
        }

        self.player.stop();
        Ok(())
    }

    /// Returns false when the user wants to quit.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        match parse_input(line) {
            Input::Empty => {}
            Input::Help => self.help(),
            Input::Quit => return Ok(false),
            Input::Unknown(err) => warn!("{err}"),
            Input::Press(button) => {
                // Nothing is played before the first interaction
                self.output.activate()?;
                self.press(button);
                self.render();
            }
        }

        Ok(true)
    }

    fn press(&mut self, button: Button) {
        if button == Button::Misturar {
            self.exercise.reshuffle();
            self.marks.clear();
            println!("[*] New exercise");
            return;
        }

        match self.exercise.press(button) {
            Response::Marked {
                button,
                verdict,
                clear_after,
            } => {
                self.marks.set(button, verdict, Instant::now(), clear_after);
                println!("[*] {button} is {}", verdict.label());
            }
            Response::Handled | Response::Ignored => {}
        }
    }

    fn on_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::ToneStarted(freq) => debug!("Playing {freq}Hz"),
            PlaybackEvent::Finished { stopped } => {
                println!(
                    "[*] Sequence {}",
                    if stopped { "stopped" } else { "finished" }
                );
                self.render();
            }
        }
    }

    fn render(&self) {
        let now = Instant::now();
        let selected = self.exercise.selected();

        let mut line = String::new();
        for button in self.exercise.buttons() {
            let label = format!("[{button}]");
            let styled = match self.marks.get(button, now) {
                Some(Verdict::Correct) => label.green().bold(),
                Some(Verdict::Incorrect) => label.red().bold(),
                None if selected == Some(button) => label.underlined(),
                None => label.stylize(),
            };
            line.push_str(&format!("{styled} "));
        }

        let state = match self.player.state() {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        println!("{line}| {state}");
    }

    fn help(&self) {
        println!("[*] Exercise `{}`", self.exercise.name());
        println!("[*] Type a button id (e.g. btnSound2) or a shortcut:");
        println!("    s      btnSound (play / pause)   s<n>  btnSound<n>");
        println!("    a      btnApito                  c     btnAveriguar");
        println!("    p      btnPause                  x     btnStop");
        println!("    v<n>   btnVelo<n>                m     btnMisturar");
        println!("    h      help                      q     quit");
    }
}

/// Turn a line typed by the user into an [`Input`].
pub fn parse_input(line: &str) -> Input {
    let line = line.trim().to_ascii_lowercase();
    let number = |prefix: &str| line.strip_prefix(prefix)?.parse::<u8>().ok();

    let button = match line.as_str() {
        "" => return Input::Empty,
        "h" | "help" | "?" => return Input::Help,
        "q" | "quit" | "exit" => return Input::Quit,
        "s" | "play" => Button::Play,
        "a" => Button::Apito,
        "c" | "check" => Button::Averiguar,
        "p" | "pause" => Button::Pause,
        "x" | "stop" => Button::Stop,
        "m" | "shuffle" => Button::Misturar,
        _ => {
            if let Some(n) = number("s") {
                Button::Sound(n)
            } else if let Some(n) = number("v") {
                Button::Velo(n)
            } else {
                match Button::from_str(&line) {
                    Ok(button) => button,
                    Err(err) => return Input::Unknown(err.to_string()),
                }
            }
        }
    };

    Input::Press(button)
}

/// Reads stdin on its own thread so the main loop can wait on it next to the playback events.
fn spawn_stdin() -> Receiver<String> {
    let (tx, rx) = channel::unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod test {
    use super::{parse_input, Input};
    use crate::exercises::Button;

    #[test]
    fn test_parse_shortcuts() {
        assert_eq!(parse_input("  "), Input::Empty);
        assert_eq!(parse_input("q"), Input::Quit);
        assert_eq!(parse_input("s"), Input::Press(Button::Play));
        assert_eq!(parse_input("s3"), Input::Press(Button::Sound(3)));
        assert_eq!(parse_input("V2"), Input::Press(Button::Velo(2)));
        assert_eq!(parse_input("c"), Input::Press(Button::Averiguar));
        assert_eq!(parse_input("m"), Input::Press(Button::Misturar));
    }

    #[test]
    fn test_parse_button_ids() {
        assert_eq!(parse_input("btnApito"), Input::Press(Button::Apito));
        assert_eq!(parse_input("btnSound4\n"), Input::Press(Button::Sound(4)));
        assert_eq!(parse_input("btnStop"), Input::Press(Button::Stop));
        assert!(matches!(parse_input("btnFoo"), Input::Unknown(_)));
        assert!(matches!(parse_input("stop3"), Input::Unknown(_)));
    }
}
