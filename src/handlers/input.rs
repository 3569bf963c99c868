// src/handlers/input.rs
use log::warn;
use std::io::{self, BufRead, Write};

use crate::handlers::report::caption_text;
use crate::handlers::wizard::{Caption, UserInputSource};

/// Line-oriented operator input over any reader/writer pair.
pub struct ConsoleInput<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        ConsoleInput { reader, writer }
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.writer
    }

    fn show(&mut self, caption: &Caption) {
        let text = caption_text(caption);
        if let Err(e) = self.writer.write_all(text.as_bytes()).and_then(|_| self.writer.flush()) {
            warn!("Failed to write prompt: {}", e);
        }
    }
}

impl ConsoleInput<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        ConsoleInput::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> UserInputSource for ConsoleInput<R, W> {
    fn prompt(&mut self, caption: &Caption) -> Option<String> {
        self.show(caption);
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!("Failed to read input: {}", e);
                None
            }
        }
    }

    fn notify(&mut self, caption: &Caption) {
        self.show(caption);
    }
}
