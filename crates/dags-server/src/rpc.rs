//! Line-oriented RPC handler
//!
//! Reads one request per line from the reader and writes one response per
//! line to the writer until EOF:
//!
//!   dags-server rpc < requests.jsonl
//!
//! Blank lines are skipped. Every non-blank line gets exactly one response,
//! including lines that fail to decode.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;

/// Main RPC handler for the dispatch server.
pub struct RpcHandler {
    dispatcher: Dispatcher,
}

impl RpcHandler {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the handler on stdin/stdout. Returns the number of requests answered.
    pub fn run(&mut self) -> io::Result<usize> {
        self.run_with_io(&mut io::stdin().lock(), &mut io::stdout().lock())
    }

    /// Run the handler with custom I/O (for testing).
    pub fn run_with_io<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> io::Result<usize> {
        let mut handled = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let response = self.dispatcher.handle_bytes(&buf);
            writeln!(writer, "{}", response)?;
            writer.flush()?;
            handled += 1;
        }

        debug!(handled, "input closed");
        Ok(handled)
    }
}
