use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver};

use tracing::debug;

/// Indicator lamps on the front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Admin,
    Guest,
    Block,
}

impl Led {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guest => "guest",
            Self::Block => "block",
        }
    }
}

/// The panel's human-facing hardware: 16x2 display, keypad, LEDs, buzzer.
///
/// The app polls for keys instead of blocking so the menu loop keeps
/// its own cadence. Hardware integration point: implement this over a
/// real keypad matrix and character LCD on target.
pub trait Hmi {
    fn show(&mut self, line1: &str, line2: &str);
    fn poll_key(&mut self) -> Option<char>;
    fn set_led(&mut self, led: Led, on: bool);
    fn beep(&mut self);
}

/// Terminal stand-in for the panel hardware. A background thread feeds
/// stdin characters into a channel the poll drains.
pub struct ConsoleHmi {
    keys: Receiver<char>,
}

impl ConsoleHmi {
    pub fn new() -> Self {
        let (sender, keys) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { return };
                for key in line.chars() {
                    if sender.send(key).is_err() {
                        return;
                    }
                }
            }
        });
        Self { keys }
    }
}

impl Default for ConsoleHmi {
    fn default() -> Self {
        Self::new()
    }
}

impl Hmi for ConsoleHmi {
    fn show(&mut self, line1: &str, line2: &str) {
        println!("+----------------+");
        println!("|{line1:<16}|");
        println!("|{line2:<16}|");
        println!("+----------------+");
    }

    fn poll_key(&mut self) -> Option<char> {
        self.keys.try_recv().ok()
    }

    fn set_led(&mut self, led: Led, on: bool) {
        debug!(led = led.as_str(), on, "led");
    }

    fn beep(&mut self) {
        print!("\x07");
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Deterministic panel double: one scripted entry per poll (`None`
    /// models a poll with no key pending), every display write and LED
    /// edge recorded.
    #[derive(Debug, Default)]
    pub struct ScriptedHmi {
        pub keys: VecDeque<Option<char>>,
        pub screens: Vec<(String, String)>,
        pub leds: Vec<(Led, bool)>,
        pub beeps: usize,
    }

    impl ScriptedHmi {
        pub fn with_keys(keys: &str) -> Self {
            Self {
                keys: keys.chars().map(Some).collect(),
                ..Self::default()
            }
        }

        /// Append `polls` empty polls (the keypad stays quiet).
        pub fn then_idle(mut self, polls: usize) -> Self {
            self.keys.extend(std::iter::repeat(None).take(polls));
            self
        }

        pub fn then_keys(mut self, keys: &str) -> Self {
            self.keys.extend(keys.chars().map(Some));
            self
        }

        pub fn led_edges(&self, led: Led) -> Vec<bool> {
            self.leds
                .iter()
                .filter(|(l, _)| *l == led)
                .map(|(_, on)| *on)
                .collect()
        }
    }

    impl Hmi for ScriptedHmi {
        fn show(&mut self, line1: &str, line2: &str) {
            self.screens.push((line1.to_string(), line2.to_string()));
        }

        fn poll_key(&mut self) -> Option<char> {
            self.keys.pop_front().flatten()
        }

        fn set_led(&mut self, led: Led, on: bool) {
            self.leds.push((led, on));
        }

        fn beep(&mut self) {
            self.beeps += 1;
        }
    }
}
