//! Print targets for the solver log stream.
//!
//! The log stream carries the iteration tables, headers and solution
//! summaries.  It is purely observational: nothing written here
//! influences a solve.

use std::fs::File;
use std::io::{stdout, Error, ErrorKind, Result, Stdout, Write};

/// Destination of the text log stream
pub enum PrintTarget {
    Stdout(Stdout),
    File(File),
    Buffer(Vec<u8>),
    /// any other writer
    Stream(Box<dyn Write + Send + Sync>),
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintTarget::Stdout(_) => write!(f, "PrintTarget::Stdout"),
            PrintTarget::File(_) => write!(f, "PrintTarget::File"),
            PrintTarget::Buffer(b) => write!(f, "PrintTarget::Buffer({} bytes)", b.len()),
            PrintTarget::Stream(_) => write!(f, "PrintTarget::Stream"),
        }
    }
}

impl Default for PrintTarget {
    fn default() -> Self {
        PrintTarget::Stdout(stdout())
    }
}

impl PrintTarget {
    /// A target for a copy of a task.  Stdout and files are shared,
    /// buffers and streams are replaced by an empty buffer.
    pub fn duplicate(&self) -> Self {
        match self {
            PrintTarget::Stdout(_) => PrintTarget::Stdout(stdout()),
            PrintTarget::File(f) => match f.try_clone() {
                Ok(f) => PrintTarget::File(f),
                Err(_) => PrintTarget::Buffer(Vec::new()),
            },
            PrintTarget::Buffer(_) | PrintTarget::Stream(_) => PrintTarget::Buffer(Vec::new()),
        }
    }

    /// Contents of the internal buffer, if this is a buffer target
    pub fn buffer_contents(&self) -> Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).to_string()),
            _ => Err(Error::new(
                ErrorKind::Other,
                "Print buffering is not configured.",
            )),
        }
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.write(buf),
            PrintTarget::File(file) => file.write(buf),
            PrintTarget::Buffer(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            PrintTarget::Stream(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.flush(),
            PrintTarget::File(file) => file.flush(),
            PrintTarget::Buffer(_) => Ok(()),
            PrintTarget::Stream(stream) => stream.flush(),
        }
    }
}

impl Drop for PrintTarget {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Implemented by objects that own a [`PrintTarget`]
pub trait ConfigurablePrintTarget {
    /// redirect print output to stdout
    fn print_to_stdout(&mut self);
    /// redirect print output to a file
    fn print_to_file(&mut self, file: File);
    /// redirect print output to a stream
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// redirect print output to an internal buffer
    fn print_to_buffer(&mut self);
    /// get the contents of the internal print buffer
    fn get_print_buffer(&mut self) -> Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout(stdout());
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        self.buffer_contents()
    }
}

#[test]
fn test_buffer_target() {
    let mut t = PrintTarget::default();
    assert!(t.get_print_buffer().is_err());
    t.print_to_buffer();
    write!(t, "iter {}", 3).unwrap();
    assert_eq!(t.get_print_buffer().unwrap(), "iter 3");
    assert!(t.duplicate().get_print_buffer().unwrap().is_empty());
}
