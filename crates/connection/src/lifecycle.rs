//! Connection lifecycle over heterogeneous native handles.
//!
//! Each backend supplies a [`ConnectionAllocator`] that knows how to open and
//! close its native client type. [`RawConnection`] owns at most one
//! live handle plus the config it was opened from, and guards every domain
//! operation with a connectedness check.

use kvbridge_core::{Error, Result};
use tracing::{error, info, warn};

/// Opens and closes one backend's native connection handles.
pub trait ConnectionAllocator {
    /// Native client object
    type Handle;
    /// Connection settings
    type Config;

    /// Backend name used in logs and errors
    fn backend_name(&self) -> &'static str;

    /// Open a new native connection.
    fn connect(&self, config: &Self::Config) -> Result<Self::Handle>;

    /// Release the handle, leaving `None` behind. Disconnecting an empty
    /// slot succeeds.
    fn disconnect(&self, handle: &mut Option<Self::Handle>) -> Result<()> {
        handle.take();
        Ok(())
    }

    /// False for an empty slot.
    fn is_connected(&self, handle: Option<&Self::Handle>) -> bool {
        handle.is_some()
    }
}

/// Connect and immediately disconnect, reporting the connect error if any.
pub fn test_connection<A: ConnectionAllocator>(allocator: &A, config: &A::Config) -> Result<()> {
    let mut handle = Some(allocator.connect(config)?);
    allocator.disconnect(&mut handle)
}

/// Single-handle wrapper around a backend's native connection.
///
/// Not meant for concurrent use: one in-flight operation per instance.
/// Open another `RawConnection` for parallel access.
pub struct RawConnection<A: ConnectionAllocator> {
    allocator: A,
    config: A::Config,
    handle: Option<A::Handle>,
}

impl<A: ConnectionAllocator> RawConnection<A> {
    /// A disconnected wrapper
    pub fn new(allocator: A, config: A::Config) -> Self {
        Self {
            allocator,
            config,
            handle: None,
        }
    }

    /// Allocator handles are opened and closed through
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Settings the connection is (or will be) opened with
    pub fn config(&self) -> &A::Config {
        &self.config
    }

    /// Replace the settings; takes effect on the next [`connect`](Self::connect).
    pub fn set_config(&mut self, config: A::Config) {
        self.config = config;
    }

    /// Open the native connection. A live handle is kept as is.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        let handle = self.allocator.connect(&self.config)?;
        self.handle = Some(handle);
        info!(target: "kvbridge::conn", backend = self.allocator.backend_name(), "Connected");
        Ok(())
    }

    /// Close the native connection; idempotent.
    pub fn disconnect(&mut self) -> Result<()> {
        let was_connected = self.is_connected();
        self.allocator.disconnect(&mut self.handle)?;
        self.handle = None;
        if was_connected {
            info!(target: "kvbridge::conn", backend = self.allocator.backend_name(), "Disconnected");
        }
        Ok(())
    }

    /// Whether a native handle is currently held
    pub fn is_connected(&self) -> bool {
        self.allocator.is_connected(self.handle.as_ref())
    }

    /// The live handle for `operation`.
    ///
    /// Returns [`Error::PreconditionViolation`] when disconnected; this is a
    /// caller ordering bug and is logged at error level.
    pub fn handle(&self, operation: &str) -> Result<&A::Handle> {
        let backend = self.allocator.backend_name();
        if !self.is_connected() {
            return Err(not_connected(backend, operation));
        }
        self.handle.as_ref().ok_or_else(|| not_connected(backend, operation))
    }

    /// Mutable access to the live handle for `operation`.
    pub fn handle_mut(&mut self, operation: &str) -> Result<&mut A::Handle> {
        let backend = self.allocator.backend_name();
        if !self.is_connected() {
            return Err(not_connected(backend, operation));
        }
        self.handle.as_mut().ok_or_else(|| not_connected(backend, operation))
    }
}

fn not_connected(backend: &str, operation: &str) -> Error {
    error!(
        target: "kvbridge::conn",
        backend,
        operation,
        "Operation attempted while disconnected"
    );
    Error::PreconditionViolation {
        reason: format!("{} called on a disconnected {} connection", operation, backend),
    }
}

impl<A: ConnectionAllocator> Drop for RawConnection<A> {
    fn drop(&mut self) {
        if let Err(e) = self.allocator.disconnect(&mut self.handle) {
            warn!(
                target: "kvbridge::conn",
                backend = self.allocator.backend_name(),
                error = %e,
                "Disconnect on drop failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counting {
        opened: Cell<u32>,
        closed: Cell<u32>,
    }

    impl ConnectionAllocator for &Counting {
        type Handle = u32;
        type Config = bool;

        fn backend_name(&self) -> &'static str {
            "counting"
        }

        fn connect(&self, reachable: &bool) -> Result<u32> {
            if !*reachable {
                return Err(Error::connection("unreachable"));
            }
            self.opened.set(self.opened.get() + 1);
            Ok(self.opened.get())
        }

        fn disconnect(&self, handle: &mut Option<u32>) -> Result<()> {
            if handle.take().is_some() {
                self.closed.set(self.closed.get() + 1);
            }
            Ok(())
        }
    }

    #[test]
    fn test_connect_disconnect_cycle() {
        let alloc = Counting::default();
        let mut raw = RawConnection::new(&alloc, true);
        assert!(!raw.is_connected());
        raw.connect().unwrap();
        raw.connect().unwrap();
        assert!(raw.is_connected());
        assert_eq!(alloc.opened.get(), 1);
        raw.disconnect().unwrap();
        raw.disconnect().unwrap();
        assert!(!raw.is_connected());
        assert_eq!(alloc.closed.get(), 1);
    }

    #[test]
    fn test_operation_while_disconnected() {
        let alloc = Counting::default();
        let mut raw = RawConnection::new(&alloc, true);
        let err = raw.handle_mut("get").unwrap_err();
        assert!(err.is_precondition_violation());
        assert!(raw.handle("get").unwrap_err().is_precondition_violation());
    }

    #[test]
    fn test_connect_failure_leaves_slot_empty() {
        let alloc = Counting::default();
        let mut raw = RawConnection::new(&alloc, false);
        assert!(matches!(raw.connect(), Err(Error::Connection { .. })));
        assert!(!raw.is_connected());
    }

    #[test]
    fn test_drop_releases_handle() {
        let alloc = Counting::default();
        {
            let mut raw = RawConnection::new(&alloc, true);
            raw.connect().unwrap();
        }
        assert_eq!(alloc.closed.get(), 1);
    }

    #[test]
    fn test_connection_opens_and_closes() {
        let alloc = Counting::default();
        test_connection(&&alloc, &true).unwrap();
        assert_eq!(alloc.closed.get(), 1);
        assert!(test_connection(&&alloc, &false).is_err());
    }
}
