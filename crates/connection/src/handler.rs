//! Generic command dispatch: text line to backend handler.
//!
//! A [`CommandHandler`] pairs a backend's command table with handler
//! functions over some target (usually a connected raw wrapper). Execution
//! tokenizes the line, resolves it against the table and hands the
//! arguments after the command name to the bound handler, which appends its
//! result to the caller's output tree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use kvbridge_command::{parse_commands, tokenize, CommandTable};
use kvbridge_core::{Error, OutputNode, Result};
use tracing::{debug, info};

/// A command handler: arguments after the command name, output parent.
pub type Handler<T> = fn(&mut T, &[String], &mut OutputNode) -> Result<()>;

/// Cancellation flag for repeated execution.
///
/// Checked between iterations only; an in-flight call is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// A flag that is not yet set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that no further iteration starts.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether an interrupt has been requested since the last [`reset`](Self::reset).
    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Dispatches command lines to handlers over `T`.
pub struct CommandHandler<T> {
    table: CommandTable<Handler<T>>,
}

impl<T> CommandHandler<T> {
    /// Bind the handlers of `table`.
    pub fn new(table: CommandTable<Handler<T>>) -> Self {
        Self { table }
    }

    /// The command table handlers are bound in
    pub fn commands(&self) -> &CommandTable<Handler<T>> {
        &self.table
    }

    /// Execute one command line. Empty lines are a [`Error::Parse`].
    pub fn execute(&self, target: &mut T, line: &str, out: &mut OutputNode) -> Result<()> {
        let argv = tokenize(line)?;
        if argv.is_empty() {
            return Err(Error::parse("empty command line"));
        }
        self.execute_argv(target, &argv, out)
    }

    /// Resolve already-tokenized input and run its handler.
    ///
    /// Resolution errors are returned before the handler is called.
    pub fn execute_argv(&self, target: &mut T, argv: &[String], out: &mut OutputNode) -> Result<()> {
        let (descriptor, off) = self.table.resolve(argv)?;
        debug!(
            target: "kvbridge::exec",
            command = descriptor.info().name(),
            argc = argv.len() - off,
            "Dispatching command"
        );
        (descriptor.handler())(target, &argv[off..], out)
    }

    /// Execute every command of a newline-separated script in order,
    /// stopping at the first failure. Returns how many commands ran.
    pub fn execute_script(&self, target: &mut T, text: &str, out: &mut OutputNode) -> Result<usize> {
        let lines = parse_commands(text)?;
        for line in &lines {
            self.execute(target, line, out)?;
        }
        Ok(lines.len())
    }

    /// Execute `line` up to `repeat` times, `interval` apart.
    ///
    /// `interrupt` is checked immediately before each iteration, after any
    /// interval sleep; once set, no further iteration starts. Returns how many iterations completed.
    pub fn execute_repeated(
        &self,
        target: &mut T,
        line: &str,
        repeat: usize,
        interval: Duration,
        interrupt: &Interrupt,
        out: &mut OutputNode,
    ) -> Result<usize> {
        let started = Instant::now();
        info!(target: "kvbridge::exec", line, repeat, "Execution started");

        let mut done = 0;
        while done < repeat {
            if done > 0 && !interval.is_zero() && !interrupt.is_interrupted() {
                thread::sleep(interval);
            }
            // Re-checked after the sleep: a request made during the
            // interval must stop the next iteration.
            if interrupt.is_interrupted() {
                info!(target: "kvbridge::exec", line, completed = done, "Execution interrupted");
                break;
            }
            self.execute(target, line, out)?;
            done += 1;
        }

        info!(
            target: "kvbridge::exec",
            line,
            completed = done,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Execution finished"
        );
        Ok(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbridge_command::{CommandDescriptor, CommandInfo};
    use kvbridge_core::Value;

    #[derive(Default)]
    struct Counter {
        calls: Vec<Vec<String>>,
    }

    fn record(target: &mut Counter, argv: &[String], out: &mut OutputNode) -> Result<()> {
        target.calls.push(argv.to_vec());
        out.attach(OutputNode::leaf(Value::from(argv.len() as i64), "\n"));
        Ok(())
    }

    fn fail(_: &mut Counter, _: &[String], _: &mut OutputNode) -> Result<()> {
        Err(Error::wire("fail", "boom"))
    }

    fn handler() -> CommandHandler<Counter> {
        CommandHandler::new(
            CommandTable::new(vec![
                CommandDescriptor::new(CommandInfo::new("MULTI SET", 2, None), record as Handler<Counter>),
                CommandDescriptor::new(CommandInfo::new("SET", 2, Some(2)), record as Handler<Counter>),
                CommandDescriptor::new(CommandInfo::new("FAIL", 0, Some(0)), fail as Handler<Counter>),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_handler_gets_args_after_name() {
        let mut target = Counter::default();
        let mut out = OutputNode::default();
        handler().execute(&mut target, "MULTI SET a 1", &mut out).unwrap();
        assert_eq!(target.calls, vec![vec!["a".to_string(), "1".to_string()]]);
        assert_eq!(out.children().len(), 1);
    }

    #[test]
    fn test_resolution_error_skips_handler() {
        let mut target = Counter::default();
        let mut out = OutputNode::default();
        let err = handler().execute(&mut target, "SET a", &mut out).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { .. }));
        assert!(target.calls.is_empty());
        assert!(out.children().is_empty());
    }

    #[test]
    fn test_empty_line_rejected() {
        let mut out = OutputNode::default();
        assert!(matches!(
            handler().execute(&mut Counter::default(), "   ", &mut out),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_script_stops_at_failure() {
        let mut target = Counter::default();
        let mut out = OutputNode::default();
        let err = handler()
            .execute_script(&mut target, "SET a 1\n# skip\nFAIL\nSET b 2", &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::WireProtocol { .. }));
        assert_eq!(target.calls.len(), 1);
    }

    #[test]
    fn test_repeated_runs_n_times() {
        let mut target = Counter::default();
        let mut out = OutputNode::default();
        let done = handler()
            .execute_repeated(&mut target, "SET a 1", 3, Duration::ZERO, &Interrupt::new(), &mut out)
            .unwrap();
        assert_eq!(done, 3);
        assert_eq!(out.children().len(), 3);
    }

    #[test]
    fn test_repeated_honors_interrupt() {
        let mut target = Counter::default();
        let mut out = OutputNode::default();
        let interrupt = Interrupt::new();
        interrupt.interrupt();
        let done = handler()
            .execute_repeated(&mut target, "SET a 1", 5, Duration::ZERO, &interrupt, &mut out)
            .unwrap();
        assert_eq!(done, 0);
        interrupt.reset();
        assert!(!interrupt.is_interrupted());
    }

    #[test]
    fn test_interrupt_during_interval_stops_next_iteration() {
        let mut target = Counter::default();
        let mut out = OutputNode::default();
        let interrupt = Interrupt::new();
        let remote = interrupt.clone();
        let raiser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.interrupt();
        });
        let done = handler()
            .execute_repeated(&mut target, "SET a 1", 5, Duration::from_millis(400), &interrupt, &mut out)
            .unwrap();
        raiser.join().unwrap();
        assert_eq!(done, 1);
        assert_eq!(target.calls.len(), 1);
        assert_eq!(out.children().len(), 1);
    }
}
