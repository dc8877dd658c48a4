//! Interactive console session: startup health check, then a prompt/answer
//! loop until the user quits, input ends, or an interrupt arrives.

use std::future::Future;
use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::client::Client;
use crate::error::ClientError;
use crate::messages::{Answer, HealthStatus};

/// Inputs that end the session (case-insensitive).
pub const EXIT_KEYWORDS: [&str; 3] = ["quit", "exit", "q"];

const WIDTH: usize = 70;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    Quit,
    Interrupted,
    EndOfInput,
    /// Startup health probe could not reach the server.
    ServerUnreachable,
}

impl SessionExit {
    /// Process exit code.
    pub fn code(self) -> u8 {
        match self {
            SessionExit::ServerUnreachable => 1,
            SessionExit::Quit | SessionExit::Interrupted | SessionExit::EndOfInput => 0,
        }
    }
}

/// One line of user input, interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    Skip,
    Ask(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if EXIT_KEYWORDS.iter().any(|k| line.eq_ignore_ascii_case(k)) {
        Command::Quit
    } else if line.is_empty() {
        Command::Skip
    } else {
        Command::Ask(line)
    }
}

/// Write the answer block: text, numbered sources (if any), processing time.
pub fn write_answer<W: Write>(out: &mut W, answer: &Answer) -> io::Result<()> {
    let rule = "─".repeat(WIDTH);
    writeln!(out, "\n{}", rule)?;
    writeln!(out, "ANSWER:")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", answer.text)?;

    if !answer.sources.is_empty() {
        writeln!(out, "\n{}", rule)?;
        writeln!(out, "SOURCES:")?;
        writeln!(out, "{}", rule)?;
        for source in &answer.sources {
            writeln!(out, "[{}] {}", source.number, source.title)?;
            writeln!(out, "    {}", source.url)?;
        }
    }

    writeln!(out, "{}", rule)?;
    writeln!(out, "Answered in {:.2}s", answer.processing_time_secs)
}

/// Console session over a borrowed [`Client`]. The caller owns the client
/// and closes it once [`Session::run`] returns.
///
/// Console write failures are ignored; they never end the loop.
pub struct Session<'c, W> {
    client: &'c Client,
    out: W,
}

impl<'c, W: Write> Session<'c, W> {
    pub fn new(client: &'c Client, out: W) -> Self {
        Self { client, out }
    }

    /// Run until quit, end of input, interrupt, or an unreachable server at
    /// startup. `interrupt` is raced against the health probe, every line
    /// read and every in-flight question; when it resolves the session ends
    /// at once.
    ///
    /// Input lines that are not valid UTF-8 are decoded lossily.
    pub async fn run<R, I>(&mut self, mut input: R, interrupt: I) -> SessionExit
    where
        R: AsyncBufRead + Unpin,
        I: Future<Output = ()>,
    {
        let client = self.client;
        tokio::pin!(interrupt);

        self.print_banner();
        let _ = writeln!(self.out, "Checking server connection...");
        let _ = self.out.flush();
        let health = tokio::select! {
            _ = &mut interrupt => None,
            health = client.probe_health() => Some(health),
        };
        let Some(health) = health else {
            return self.farewell(SessionExit::Interrupted);
        };
        if let Some(exit) = self.report_health(health) {
            return exit;
        }

        let mut buf = Vec::new();
        loop {
            let _ = write!(self.out, "\nYour question: ");
            let _ = self.out.flush();

            buf.clear();
            let read = tokio::select! {
                _ = &mut interrupt => None,
                read = input.read_until(b'\n', &mut buf) => Some(read),
            };
            match read {
                None => return self.farewell(SessionExit::Interrupted),
                Some(Ok(0)) => return self.farewell(SessionExit::EndOfInput),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "failed to read input");
                    return self.farewell(SessionExit::EndOfInput);
                }
            }
            let line = String::from_utf8_lossy(&buf).into_owned();

            let question = match parse_command(&line) {
                Command::Quit => return self.farewell(SessionExit::Quit),
                Command::Skip => continue,
                Command::Ask(question) => question,
            };

            let _ = writeln!(self.out, "\nSearching sources and generating answer...");
            let _ = self.out.flush();

            let result = tokio::select! {
                _ = &mut interrupt => None,
                result = client.ask_question(question) => Some(result),
            };
            match result {
                None => return self.farewell(SessionExit::Interrupted),
                Some(Ok(answer)) => {
                    let _ = write_answer(&mut self.out, &answer);
                }
                Some(Err(e)) => self.print_ask_error(&e),
            }
        }
    }

    fn print_banner(&mut self) {
        let rule = "=".repeat(WIDTH);
        let _ = writeln!(self.out, "{}", rule);
        let _ = writeln!(self.out, "AISHE Question Answering");
        let _ = writeln!(self.out, "{}", rule);
        let _ = writeln!(self.out, "Ask questions and get answers with cited sources.");
        let _ = writeln!(self.out, "Type 'quit' or 'exit' to stop.");
        let _ = writeln!(self.out, "{}", rule);
        let _ = writeln!(self.out);
    }

    /// Returns an exit only when the server is unreachable.
    fn report_health(&mut self, health: Result<HealthStatus, ClientError>) -> Option<SessionExit> {
        match health {
            Ok(health) if health.is_healthy() => {
                let _ = writeln!(self.out, "✓ Connected to server");
            }
            Ok(health) => {
                let _ = writeln!(self.out, "⚠ Server status: {}", health.status);
                if let Some(message) = &health.message {
                    let _ = writeln!(self.out, "  {}", message);
                }
            }
            Err(e @ ClientError::ServerNotReachable { .. }) => {
                tracing::debug!(error = %e, "startup health probe failed");
                let _ = writeln!(self.out, "\n❌ Error: {}", e);
                let _ = writeln!(self.out, "\nPlease start the server first.");
                let _ = writeln!(
                    self.out,
                    "Or set AISHE_API_URL to point to a running server (currently {}).",
                    self.client.endpoint().base_url()
                );
                return Some(SessionExit::ServerUnreachable);
            }
            Err(e) => {
                tracing::debug!(kind = e.kind(), error = %e, "health probe failed, continuing");
                let _ = writeln!(self.out, "\n⚠ Warning: Could not check server health: {}", e);
                let _ = writeln!(self.out, "Continuing anyway...");
            }
        }
        let _ = writeln!(self.out);
        None
    }

    fn print_ask_error(&mut self, err: &ClientError) {
        tracing::debug!(kind = err.kind(), error = %err, "question failed");
        match err {
            ClientError::ServerNotReachable { .. } => {
                let _ = writeln!(self.out, "\n❌ Server Error: {}", err);
                let _ = writeln!(self.out, "\nThe server may have stopped. Please restart it.");
            }
            ClientError::ServerError { .. } => {
                let _ = writeln!(self.out, "\n❌ Server Error: {}", err);
            }
            ClientError::InvalidInput(_) | ClientError::Client { .. } => {
                let _ = writeln!(self.out, "\n❌ Error: {}", err);
            }
        }
    }

    fn farewell(&mut self, exit: SessionExit) -> SessionExit {
        let lead = if exit == SessionExit::Interrupted { "\n\n" } else { "\n" };
        let _ = writeln!(self.out, "{}Goodbye!", lead);
        let _ = self.out.flush();
        exit
    }
}
