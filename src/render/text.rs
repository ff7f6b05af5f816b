//! Plain-text view
//!
//! Mirrors the history log onto any `io::Write` as it grows. The live input
//! entry is shown as a bare prompt without a newline so the next line typed
//! by the user follows it.

use super::{Entry, HistoryView, PROMPT};
use std::io::{self, Write};

pub struct TextView<W: Write> {
    out: W,
    /// A prompt was written and not yet followed by a newline
    prompt_open: bool,
    /// Echo submitted commands (off when the terminal already echoes input)
    echo_commands: bool,
    /// A write failed; only the first failure is logged
    write_failed: bool,
}

impl<W: Write> TextView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            prompt_open: false,
            echo_commands: true,
            write_failed: false,
        }
    }

    /// Skip command echoes; for interactive use where the typed line is already visible
    pub fn without_echo(mut self) -> Self {
        self.echo_commands = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// True once a write to the output has failed (closed pipe, full disk)
    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    fn check(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if !self.write_failed {
                crate::console_log!("[view] output write failed: {}", e);
            }
            self.write_failed = true;
        }
    }

    fn close_prompt(&mut self) {
        if self.prompt_open {
            let result = writeln!(self.out);
            self.check(result);
            self.prompt_open = false;
        }
    }
}

impl<W: Write> HistoryView for TextView<W> {
    fn append(&mut self, entry: &Entry) {
        if let Entry::CommandEcho { text } = entry {
            if !self.echo_commands {
                // The user's own newline already closed the prompt line
                self.prompt_open = false;
                return;
            }
            if self.prompt_open {
                // Finish the open prompt line with the command
                let result = writeln!(self.out, "{}", text);
                self.check(result);
                self.prompt_open = false;
                return;
            }
        }
        self.close_prompt();
        let result = writeln!(self.out, "{}", entry.to_text());
        self.check(result);
    }

    fn remove_input(&mut self) {}

    fn show_input(&mut self) {
        self.close_prompt();
        let result = write!(self.out, "{}", PROMPT).and_then(|()| self.out.flush());
        self.check(result);
        self.prompt_open = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::History;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// `Write` handle whose buffer outlives the view
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    #[test]
    fn test_transcript() {
        let buf = Shared::default();
        let mut h = History::with_view(Box::new(TextView::new(buf.clone())));
        h.print_line("Welcome");
        h.arm_input();
        h.remove_input();
        h.echo("help");
        h.print_error("nope");
        h.arm_input();
        assert_eq!(buf.text(), "$ Welcome\n$ help\nerror: nope\n$ ");
    }

    #[test]
    fn test_without_echo() {
        let buf = Shared::default();
        let mut h = History::with_view(Box::new(TextView::new(buf.clone()).without_echo()));
        h.arm_input();
        h.remove_input();
        h.echo("ls");
        h.print_line("out");
        assert_eq!(buf.text(), "$ $ out\n");
    }

    /// Writer standing in for a closed pipe
    struct Closed(Rc<RefCell<u32>>);

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            *self.0.borrow_mut() += 1;
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_recorded() {
        let attempts = Rc::new(RefCell::new(0));
        let mut view = TextView::new(Closed(attempts.clone()));
        assert!(!view.write_failed());
        view.append(&Entry::CommandEcho {
            text: "ls".into(),
        });
        view.show_input();
        view.append(&Entry::ErrorOutput {
            message: "two".into(),
        });
        assert!(view.write_failed());
        assert!(*attempts.borrow() >= 3);
    }
}
