use std::io::{self, BufRead, Write};

/// Where `leia` gets its lines from.
pub trait Input {
    /// Next line without its terminator, or `None` once input is exhausted.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Where `escreva` sends its text.
pub trait Output {
    fn write_text(&mut self, text: &str) -> io::Result<()>;
}

fn strip_terminator(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

impl<R: BufRead> Input for R {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if BufRead::read_line(self, &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_terminator(line)))
    }
}

/// Reads from the process stdin one line at a time, sharing std's buffer so
/// the interactive prompt and `leia` never steal each other's input.
pub struct StdinInput;

impl Input for StdinInput {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_terminator(line)))
    }
}

impl<W: Write> Output for W {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.write_all(text.as_bytes())?;
        self.flush()
    }
}
