use std::{
    cell::RefCell,
    io::{self, BufRead, Cursor, Write},
    rc::Rc,
};

use crate::{
    ast::Position,
    error::RuntimeError,
    interpreter::runtime::window::{HeadlessWindow, WindowHost},
};

/// Output buffer shared between a captured [`Host`] and its creator.
pub type SharedOutput = Rc<RefCell<Vec<u8>>>;

struct SharedWriter(SharedOutput);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything a program can reach outside the interpreter.
pub struct Host {
    /// Destination of `$` and `$$`.
    pub output: Box<dyn Write>,
    /// Source of `in()`.
    pub input:  Box<dyn BufRead>,
    /// The window collaborator.
    pub window: Box<dyn WindowHost>,
}

impl Host {
    /// Builds a host on the process's standard streams with a headless
    /// window.
    #[must_use]
    pub fn stdio(frame_limit: Option<u64>) -> Self {
        Self { output: Box::new(io::BufWriter::new(io::stdout())),
               input:  Box::new(io::BufReader::new(io::stdin())),
               window: Box::new(HeadlessWindow::new(frame_limit)), }
    }

    /// Builds a host that reads `input` and collects output in memory.
    #[must_use]
    pub fn captured(input: &str, frame_limit: Option<u64>) -> (Self, SharedOutput) {
        let buffer = SharedOutput::default();
        let host = Self { output: Box::new(SharedWriter(Rc::clone(&buffer))),
                          input:  Box::new(Cursor::new(input.as_bytes().to_vec())),
                          window: Box::new(HeadlessWindow::new(frame_limit)), };
        (host, buffer)
    }

    /// Writes program output.
    pub fn write(&mut self, text: &str, pos: Position) -> Result<(), RuntimeError> {
        self.output.write_all(text.as_bytes()).map_err(|e| io_error(&e, pos))
    }

    /// Reads one line without its line terminator. End of input gives an
    /// empty string.
    ///
    /// Pending output is flushed first so prompts appear before the read
    /// blocks.
    pub fn read_line(&mut self, pos: Position) -> Result<String, RuntimeError> {
        self.flush(pos)?;
        let mut line = String::new();
        self.input.read_line(&mut line).map_err(|e| io_error(&e, pos))?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Flushes pending output.
    pub fn flush(&mut self, pos: Position) -> Result<(), RuntimeError> {
        self.output.flush().map_err(|e| io_error(&e, pos))
    }
}

fn io_error(err: &io::Error, pos: Position) -> RuntimeError {
    RuntimeError::Io { details: err.to_string(),
                       pos }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_host_collects_output() {
        let (mut host, out) = Host::captured("", None);
        host.write("a", Position::default()).unwrap();
        host.write("b\n", Position::default()).unwrap();
        assert_eq!(out.borrow().as_slice(), b"ab\n");
    }

    #[test]
    fn read_line_strips_terminators_and_handles_eof() {
        let (mut host, _) = Host::captured("first\r\nsecond", None);
        let pos = Position::default();
        assert_eq!(host.read_line(pos).unwrap(), "first");
        assert_eq!(host.read_line(pos).unwrap(), "second");
        assert_eq!(host.read_line(pos).unwrap(), "");
    }
}
