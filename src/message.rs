//! Messages exchanged between components.
//!
//! A message is any type implementing the [`Message`] trait, carried as a
//! reference-counted [`Payload`] so fan-out delivery never copies the
//! underlying data. The trait exposes exactly one classification the
//! runtime itself depends on: [`Message::is_shutdown`]. Components and
//! containers must recognize a shutdown-classified message and re-emit it
//! on their `signal` mailbox (never silently swallow it) before
//! terminating.
//!
//! # Examples
//!
//! ```rust
//! use wiregraph::message::{payload, Message, Shutdown, Text};
//!
//! let greeting = payload(Text::new("hello"));
//! assert!(!greeting.is_shutdown());
//! assert_eq!(greeting.downcast_ref::<Text>().unwrap().content, "hello");
//!
//! let notice = payload(Shutdown);
//! assert!(notice.is_shutdown());
//! ```

use std::any::Any;
use std::rc::Rc;

/// Capability every message type must provide.
///
/// The runtime never inspects a payload beyond shutdown classification;
/// leaf components recover concrete types through
/// [`downcast_ref`](dyn Message::downcast_ref).
pub trait Message: Any {
    /// Whether this message signals graceful termination.
    ///
    /// Defaults to `false`; shutdown kinds override it.
    fn is_shutdown(&self) -> bool {
        false
    }

    /// Upcast for downcasting support.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Message {
    /// Attempt to view this message as a concrete type.
    #[must_use]
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref()
    }
}

/// A shared handle to a message.
///
/// Cloning a `Payload` clones the handle, not the message, so the post
/// office can fan one emission out to any number of sinks.
pub type Payload = Rc<dyn Message>;

/// Wrap a message into a shareable [`Payload`].
#[must_use]
pub fn payload<M: Message>(message: M) -> Payload {
    Rc::new(message)
}

/// General shutdown notice.
///
/// Delivered on `control`, relayed on `signal`, and propagated depth-first
/// through every container boundary it crosses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shutdown;

impl Message for Shutdown {
    fn is_shutdown(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Emitted by a producer on its `signal` mailbox when its input is
/// exhausted. Shutdown-classified, so it cascades like [`Shutdown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProducerFinished;

impl Message for ProducerFinished {
    fn is_shutdown(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The scheduler's poke, delivered on `control` to eager components when
/// no real traffic is queued for them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick;

impl Message for Tick {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A plain string payload for tests, demos, and simple pipelines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Text {
    /// The text carried by this message.
    pub content: String,
}

impl Text {
    /// Creates a new text message.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl Message for Text {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
