//! Per-bus serialization of DALI traffic.
//!
//! DALI is a shared half-duplex bus: a second command sent before the first
//! one's backward frame arrived corrupts both exchanges. [`SharedBus`] owns
//! the transport behind one mutex and is the only way to reach it, so every
//! lamp and bus entity on the same physical bus is strictly serialized,
//! while different buses proceed independently.
//!
//! ```text
//! ┌──────────┐
//! │ Lamp A0  │──┐
//! └──────────┘  │    ┌───────────────────┐      ┌────────────┐
//! ┌──────────┐  ├───►│ SharedBus (Mutex) │─────►│ Transport  │
//! │ Lamp A7  │──┤    └───────────────────┘      └────────────┘
//! └──────────┘  │
//! ┌──────────┐  │
//! │ Bus      │──┘
//! └──────────┘
//! ```
//!
//! Each bus also carries its own `tracing` span. Everything logged while
//! talking to the bus is recorded inside it, which is how the bus index and
//! name reach log lines without any global logger state.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{Instrument, Span, trace};

use crate::command::{Command, Response};
use crate::error::Result;
use crate::traits::DaliTransport;
use crate::types::TransportInfo;

struct BusInner<T> {
    index: usize,
    name: String,
    info: TransportInfo,
    span: Span,
    transport: Mutex<T>,
}

/// A transport shared by every entity on one physical bus.
///
/// Cloning is cheap and every clone refers to the same lock.
///
/// # Examples
///
/// ```
/// use dalilight_hardware::bus::SharedBus;
/// use dalilight_hardware::command::{Command, Response};
/// use dalilight_hardware::mock::MockTransport;
/// use dalilight_core::ShortAddress;
///
/// #[tokio::main]
/// async fn main() -> dalilight_hardware::Result<()> {
///     let (transport, handle) = MockTransport::new();
///     handle.add_gear(0, 254);
///     let bus = SharedBus::new(0, "office", transport);
///
///     let level = bus
///         .exchange(Command::QueryActualLevel(ShortAddress::new(0).unwrap()))
///         .await?;
///     assert_eq!(level, Response::Level(254));
///     Ok(())
/// }
/// ```
pub struct SharedBus<T> {
    inner: Arc<BusInner<T>>,
}

impl<T> Clone for SharedBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SharedBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBus")
            .field("index", &self.inner.index)
            .field("name", &self.inner.name)
            .field("info", &self.inner.info)
            .finish()
    }
}

impl<T: DaliTransport> SharedBus<T> {
    /// Wrap a transport as bus number `index`.
    pub fn new(index: usize, name: impl Into<String>, transport: T) -> Self {
        let name = name.into();
        let info = transport.info();
        let span = tracing::info_span!("dali_bus", index, name = %name);

        Self {
            inner: Arc::new(BusInner {
                index,
                name,
                info,
                span,
                transport: Mutex::new(transport),
            }),
        }
    }

    /// Send one command under the bus lock.
    ///
    /// The lock is held until the outcome is known.
    pub async fn exchange(&self, command: Command) -> Result<Response> {
        let mut session = self.session().await;
        session.exchange(command).await
    }

    /// Acquire the bus lock for a sequence of exchanges.
    ///
    /// No other entity can reach the bus until the session is dropped.
    pub async fn session(&self) -> BusSession<'_, T> {
        let transport = self
            .inner
            .transport
            .lock()
            .instrument(self.inner.span.clone())
            .await;
        BusSession {
            transport,
            span: &self.inner.span,
        }
    }
}

impl<T> SharedBus<T> {
    pub fn index(&self) -> usize {
        self.inner.index
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn info(&self) -> &TransportInfo {
        &self.inner.info
    }

    /// Span every log line about this bus is recorded in.
    pub fn span(&self) -> &Span {
        &self.inner.span
    }
}

/// Exclusive access to a bus, held for as long as the value lives.
pub struct BusSession<'a, T> {
    transport: MutexGuard<'a, T>,
    span: &'a Span,
}

impl<T: DaliTransport> BusSession<'_, T> {
    /// Send one command while keeping the lock.
    pub async fn exchange(&mut self, command: Command) -> Result<Response> {
        let span = self.span.clone();
        let result = self.transport.send(command).instrument(span.clone()).await;
        span.in_scope(|| trace!(%command, ?result, "exchange"));
        result
    }
}
