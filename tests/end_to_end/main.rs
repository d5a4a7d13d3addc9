//! End-to-end suite for the kvbridge facade
//!
//! Drives text commands through tokenizer, resolver, handler and the
//! in-process SSDB driver, and checks translator output across backends.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test end_to_end
//!
//! # Scripts only
//! cargo test --test end_to_end scripts::
//! ```

use std::sync::Arc;

use kvbridge::ssdb::{command_handler, MemoryConnector, SsdbRaw};
use kvbridge::{CommandHandler, OutputNode, SsdbConfig};

mod configs;
mod scripts;
mod translation;

/// A connected wrapper over a fresh in-process store, plus its dispatcher.
pub struct Session {
    pub store: MemoryConnector,
    pub raw: SsdbRaw,
    pub handler: CommandHandler<SsdbRaw>,
}

impl Session {
    pub fn new() -> Self {
        let store = MemoryConnector::new();
        let mut raw = SsdbRaw::new(Arc::new(store.clone()), SsdbConfig::default());
        raw.connect().expect("in-process connect");
        Self {
            store,
            raw,
            handler: command_handler().expect("valid command table"),
        }
    }

    pub fn run(&mut self, line: &str) -> kvbridge::Result<OutputNode> {
        let mut out = OutputNode::default();
        self.handler.execute(&mut self.raw, line, &mut out)?;
        Ok(out)
    }
}
