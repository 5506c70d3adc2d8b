//! Speech input/output seams.
//!
//! The recognizer and synthesizer engines are external collaborators; the
//! core only needs these two narrow traits. `ConsoleSpeech` is the bundled
//! adapter for running headless (stdin transcripts, stdout speech), and the
//! scripted fakes for tests live in [`crate::test_utils`].

use std::io::{BufRead, Write};
use tracing::warn;

/// Source of user utterances.
///
/// A `None` transcript means nothing usable was heard (silence, timeout,
/// garbled recognition). That is an ordinary outcome, not an error.
pub trait SpeechInput: Send {
    /// Block until the wake word is heard. Returns `false` if the input
    /// source is exhausted and the session should end.
    fn listen_for_wake_word(&mut self) -> bool;

    /// Block for one spoken command.
    fn listen_for_command(&mut self) -> Option<String>;
}

/// Sink for assistant speech.
///
/// Speaking always succeeds from the caller's perspective; transport
/// failures are swallowed and logged.
pub trait SpeechOutput: Send + Sync {
    /// Vocalize `text`.
    fn speak(&self, text: &str);
}

/// Headless adapter: reads transcripts from stdin, prints speech to stdout.
///
/// A line containing the wake word satisfies wake-word detection; an empty
/// line while listening for a command counts as "nothing heard".
pub struct ConsoleSpeech {
    wake_word: String,
}

impl ConsoleSpeech {
    /// Create a console adapter with the configured wake word.
    #[must_use]
    pub fn new(wake_word: &str) -> Self {
        Self {
            wake_word: wake_word.to_lowercase(),
        }
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        let stdin = std::io::stdin();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_owned()),
            Err(e) => {
                warn!("stdin read failed: {e}");
                None
            }
        }
    }
}

impl SpeechInput for ConsoleSpeech {
    fn listen_for_wake_word(&mut self) -> bool {
        loop {
            print!("(wake) > ");
            let _ = std::io::stdout().flush();
            match self.read_line() {
                Some(line) if line.to_lowercase().contains(&self.wake_word) => return true,
                Some(_) => continue,
                None => return false,
            }
        }
    }

    fn listen_for_command(&mut self) -> Option<String> {
        print!("(you) > ");
        let _ = std::io::stdout().flush();
        match self.read_line() {
            Some(line) if !line.is_empty() => Some(line),
            _ => None,
        }
    }
}

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) {
        println!("[sable] {text}");
    }
}
