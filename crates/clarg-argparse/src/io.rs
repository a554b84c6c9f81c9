//! Output and termination collaborators used by the built-in options.

use std::cell::RefCell;
use std::io::Write as _;
use std::rc::Rc;

/// Line-oriented text sink for help and version output.
pub trait Writer {
    fn write(&mut self, text: &str);

    fn writeln(&mut self, line: &str) {
        self.write(line);
        self.write("\n");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl Writer for StdoutWriter {
    fn write(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        // A closed pipe (e.g. `| head`) is not worth failing over.
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

/// In-memory writer. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferWriter(Rc<RefCell<String>>);

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }
}

impl Writer for BufferWriter {
    fn write(&mut self, text: &str) {
        self.0.borrow_mut().push_str(text);
    }
}

/// Called after help or version output. Whether the process really
/// terminates is up to the implementation.
pub trait ExitHook {
    fn exit(&mut self, code: i32);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl ExitHook for ProcessExit {
    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

/// Records exit codes instead of exiting. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingExit(Rc<RefCell<Vec<i32>>>);

impl RecordingExit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn codes(&self) -> Vec<i32> {
        self.0.borrow().clone()
    }
}

impl ExitHook for RecordingExit {
    fn exit(&mut self, code: i32) {
        self.0.borrow_mut().push(code);
    }
}
