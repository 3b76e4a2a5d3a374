//! Ready-made leaf components for common pipeline roles.
//!
//! Every adapter honors the shutdown contract: a shutdown-classified
//! message arriving on any mailbox is re-emitted on `signal` and the
//! adapter finishes. Shutdown is never swallowed.
//!
//! # Examples
//!
//! ```rust
//! use wiregraph::adapters::{FilterFn, Producer};
//! use wiregraph::component::entity;
//! use wiregraph::message::{payload, Payload, Text};
//!
//! let source = entity(Producer::new(
//!     (1..=3).map(|n| payload(Text::new(n.to_string()))),
//! ));
//!
//! let shout = entity(FilterFn::new(|message: Payload| {
//!     let text = message.downcast_ref::<Text>()?;
//!     Some(payload(Text::new(text.content.to_uppercase())))
//! }));
//! # let _ = (source, shout);
//! ```

use crate::component::{Component, Step, TerminatedError};
use crate::mailbox::Mailbox;
use crate::message::{payload, Payload, ProducerFinished};

/// Relay a shutdown-classified message on `signal`, terminating the
/// adapter.
fn shutdown_relay(message: &Payload) -> Option<Step> {
    message
        .is_shutdown()
        .then(|| Step::Final(Mailbox::Signal, message.clone()))
}

// ============================================================================
// Passthrough
// ============================================================================

/// Re-emits every `inbox` message on `outbox` unchanged.
#[derive(Default)]
pub struct Passthrough {
    terminated: bool,
}

impl Passthrough {
    /// Creates a passthrough stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Passthrough {
    fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        if let Some(step) = shutdown_relay(&message) {
            self.terminated = true;
            return Ok(step);
        }
        match inbox {
            Mailbox::Inbox => Ok(Step::Emit(Mailbox::Outbox, message)),
            _ => Ok(Step::Idle),
        }
    }

    fn close(&mut self) {
        self.terminated = true;
    }
}

// ============================================================================
// FilterFn
// ============================================================================

/// Maps each `inbox` payload through a callable.
///
/// `Some(result)` is emitted on `outbox`; `None` suppresses the message
/// (an idle step). A callable that returns a shutdown-classified message
/// shuts the filter down: the result is relayed on `signal` and the
/// filter finishes.
pub struct FilterFn<F> {
    op: F,
    terminated: bool,
}

impl<F> FilterFn<F>
where
    F: FnMut(Payload) -> Option<Payload>,
{
    /// Creates a filter stage around the callable.
    #[must_use]
    pub fn new(op: F) -> Self {
        Self {
            op,
            terminated: false,
        }
    }
}

impl<F> Component for FilterFn<F>
where
    F: FnMut(Payload) -> Option<Payload>,
{
    fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        if let Some(step) = shutdown_relay(&message) {
            self.terminated = true;
            return Ok(step);
        }
        if inbox != Mailbox::Inbox {
            return Ok(Step::Idle);
        }
        match (self.op)(message) {
            Some(result) if result.is_shutdown() => {
                self.terminated = true;
                Ok(Step::Final(Mailbox::Signal, result))
            }
            Some(result) => Ok(Step::Emit(Mailbox::Outbox, result)),
            None => Ok(Step::Idle),
        }
    }

    fn close(&mut self) {
        self.terminated = true;
    }
}

// ============================================================================
// Producer
// ============================================================================

/// Yields one item of an iterator per step on `outbox`.
///
/// Eager: the scheduler pokes it with `(control, Tick)` whenever it has
/// no queued mail. On exhaustion it emits [`ProducerFinished`] on
/// `signal` and finishes.
pub struct Producer<I> {
    items: I,
    terminated: bool,
}

impl<I> Producer<I>
where
    I: Iterator<Item = Payload>,
{
    /// Creates a producer over the iterator.
    #[must_use]
    pub fn new(items: I) -> Self {
        Self {
            items,
            terminated: false,
        }
    }
}

impl<I> Component for Producer<I>
where
    I: Iterator<Item = Payload>,
{
    fn step(&mut self, _inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        if let Some(step) = shutdown_relay(&message) {
            self.terminated = true;
            return Ok(step);
        }
        match self.items.next() {
            Some(item) => Ok(Step::Emit(Mailbox::Outbox, item)),
            None => {
                self.terminated = true;
                Ok(Step::Final(Mailbox::Signal, payload(ProducerFinished)))
            }
        }
    }

    fn close(&mut self) {
        self.terminated = true;
    }

    fn lazy(&self) -> bool {
        false
    }
}

// ============================================================================
// SinkFn
// ============================================================================

/// Consumes `inbox` payloads with a callable.
///
/// Emits nothing, unless the callable returns a shutdown-classified
/// message; that message is then relayed on `signal` and the sink
/// finishes, which lets a consumer decide when the run is over.
pub struct SinkFn<F> {
    op: F,
    terminated: bool,
}

impl<F> SinkFn<F>
where
    F: FnMut(Payload) -> Option<Payload>,
{
    /// Creates a consuming stage around the callable.
    #[must_use]
    pub fn new(op: F) -> Self {
        Self {
            op,
            terminated: false,
        }
    }
}

impl<F> Component for SinkFn<F>
where
    F: FnMut(Payload) -> Option<Payload>,
{
    fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        if let Some(step) = shutdown_relay(&message) {
            self.terminated = true;
            return Ok(step);
        }
        if inbox != Mailbox::Inbox {
            return Ok(Step::Idle);
        }
        match (self.op)(message) {
            Some(result) if result.is_shutdown() => {
                self.terminated = true;
                Ok(Step::Final(Mailbox::Signal, result))
            }
            _ => Ok(Step::Idle),
        }
    }

    fn close(&mut self) {
        self.terminated = true;
    }
}

// ============================================================================
// NullSink
// ============================================================================

/// Swallows everything on `inbox`; honors shutdown like every adapter.
#[derive(Default)]
pub struct NullSink {
    terminated: bool,
}

impl NullSink {
    /// Creates a discarding stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for NullSink {
    fn step(&mut self, _inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        if let Some(step) = shutdown_relay(&message) {
            self.terminated = true;
            return Ok(step);
        }
        Ok(Step::Idle)
    }

    fn close(&mut self) {
        self.terminated = true;
    }
}
