//! The post office: link registration and message delivery.
//!
//! The post office is the message router. It keeps the registered link
//! set and, for every posted `(source, outbox, message)` emission, fans
//! the message out to the inbound queue of each linked `(sink, inbox)`.
//! Retrieval (and subsequent delivery to components) is the scheduler's
//! job.
//!
//! Entities are keyed by identity; the link set is expected to be static
//! for the lifetime of a container, since containers expose no dynamic
//! re-registration.
//!
//! # Examples
//!
//! ```rust
//! use wiregraph::adapters::Passthrough;
//! use wiregraph::component::entity;
//! use wiregraph::links::Link;
//! use wiregraph::mailbox::Mailbox;
//! use wiregraph::message::{payload, Text};
//! use wiregraph::post_office::PostOffice;
//!
//! let a = entity(Passthrough::new());
//! let b = entity(Passthrough::new());
//!
//! let mut post_office = PostOffice::new();
//! post_office.register(&Link::new(&a, "outbox", &b, "inbox"))?;
//! post_office.post(&a, Mailbox::Outbox, payload(Text::new("hi")))?;
//!
//! let mail = post_office.retrieve(&b)?;
//! assert_eq!(mail.len(), 1);
//! assert_eq!(mail[0].0, Mailbox::Inbox);
//! # Ok::<(), wiregraph::post_office::PostOfficeError>(())
//! ```

use std::collections::VecDeque;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::component::{Entity, EntityId};
use crate::links::Link;
use crate::mailbox::Mailbox;
use crate::message::Payload;

/// Where one registered link delivers to.
#[derive(Clone, PartialEq, Eq)]
struct Destination {
    sink: EntityId,
    inbox: Mailbox,
}

/// Routes messages between mailboxes according to the registered link
/// set.
#[derive(Default)]
pub struct PostOffice {
    link_ignores_duplicates: bool,
    unlink_ignores_missing: bool,
    /// `(source, outbox)` to the destinations it fans out to.
    routes: FxHashMap<(EntityId, Mailbox), Vec<Destination>>,
    /// How many registered links target each sink. A sink with degree
    /// zero is forgotten, but its queue survives until drained.
    sink_degree: FxHashMap<EntityId, usize>,
    /// Accumulated `(inbox, message)` pairs per sink, in arrival order.
    queues: FxHashMap<EntityId, VecDeque<(Mailbox, Payload)>>,
}

impl PostOffice {
    /// Creates a post office with strict duplicate/missing-link checks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes [`register`](Self::register) idempotent: re-registering an
    /// existing link becomes a no-op instead of an error.
    #[must_use]
    pub fn with_link_ignores_duplicates(mut self, yes: bool) -> Self {
        self.link_ignores_duplicates = yes;
        self
    }

    /// Makes [`unregister`](Self::unregister) idempotent: removing a
    /// link that was never added becomes a no-op instead of an error.
    #[must_use]
    pub fn with_unlink_ignores_missing(mut self, yes: bool) -> Self {
        self.unlink_ignores_missing = yes;
        self
    }

    /// Registers a resolved link.
    ///
    /// Once registered, every message posted from the link's source
    /// outbox is delivered to the queue of the link's sink inbox.
    pub fn register(&mut self, link: &Link) -> Result<(), PostOfficeError> {
        let key = (EntityId::of(&link.source), link.source_mailbox.clone());
        let destination = Destination {
            sink: EntityId::of(&link.sink),
            inbox: link.sink_mailbox.clone(),
        };
        let destinations = self.routes.entry(key).or_default();
        if destinations.contains(&destination) {
            if self.link_ignores_duplicates {
                return Ok(());
            }
            return Err(PostOfficeError::LinkExists {
                from: EntityId::of(&link.source),
                outbox: link.source_mailbox.clone(),
                sink: destination.sink,
                inbox: destination.inbox,
            });
        }
        *self.sink_degree.entry(destination.sink).or_insert(0) += 1;
        destinations.push(destination);
        Ok(())
    }

    /// Registers every link in the iterator, in order.
    pub fn register_all<'a>(
        &mut self,
        links: impl IntoIterator<Item = &'a Link>,
    ) -> Result<(), PostOfficeError> {
        for link in links {
            self.register(link)?;
        }
        Ok(())
    }

    /// Unregisters a previously registered link.
    ///
    /// Other links sharing the same source outbox or sink inbox are
    /// unaffected. Messages already queued for the sink are kept for
    /// delivery; the queue disappears only after draining.
    pub fn unregister(&mut self, link: &Link) -> Result<(), PostOfficeError> {
        let source = EntityId::of(&link.source);
        let key = (source, link.source_mailbox.clone());
        let destination = Destination {
            sink: EntityId::of(&link.sink),
            inbox: link.sink_mailbox.clone(),
        };
        let removed = match self.routes.get_mut(&key) {
            Some(destinations) => match destinations.iter().position(|d| *d == destination) {
                Some(index) => {
                    destinations.remove(index);
                    if destinations.is_empty() {
                        self.routes.remove(&key);
                    }
                    true
                }
                None => false,
            },
            None => false,
        };
        if !removed {
            if self.unlink_ignores_missing {
                return Ok(());
            }
            return Err(PostOfficeError::NoLink {
                from: source,
                outbox: link.source_mailbox.clone(),
            });
        }
        let degree = self
            .sink_degree
            .get_mut(&destination.sink)
            .expect("registered sink has a degree entry");
        *degree -= 1;
        if *degree == 0 {
            self.sink_degree.remove(&destination.sink);
        }
        Ok(())
    }

    /// Posts a message from the source's outbox, fanning it out to every
    /// linked sink queue.
    pub fn post(
        &mut self,
        source: &Entity,
        outbox: Mailbox,
        message: Payload,
    ) -> Result<(), PostOfficeError> {
        let source = EntityId::of(source);
        let Some(destinations) = self.routes.get(&(source, outbox.clone())) else {
            return Err(PostOfficeError::NoLink { from: source, outbox });
        };
        tracing::trace!(%source, %outbox, fan_out = destinations.len(), "posting message");
        for destination in destinations {
            self.queues
                .entry(destination.sink)
                .or_default()
                .push_back((destination.inbox.clone(), message.clone()));
        }
        Ok(())
    }

    /// Returns and clears all accumulated `(inbox, message)` pairs for
    /// the sink, in arrival order (FIFO per edge).
    ///
    /// An empty queue yields an empty result, not an error; an entity
    /// that is not a sink in any registered link (and has no leftover
    /// queue from an unregistered one) fails with
    /// [`PostOfficeError::NotASink`].
    pub fn retrieve(&mut self, sink: &Entity) -> Result<Vec<(Mailbox, Payload)>, PostOfficeError> {
        let sink = EntityId::of(sink);
        let registered = self.sink_degree.contains_key(&sink);
        if !registered && !self.queues.contains_key(&sink) {
            return Err(PostOfficeError::NotASink { sink });
        }
        let mail = self
            .queues
            .get_mut(&sink)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default();
        if !registered {
            // Last drain of a fully unlinked sink; drop the queue.
            self.queues.remove(&sink);
        }
        Ok(mail)
    }

    /// Whether the entity is currently a sink in any registered link.
    #[must_use]
    pub fn is_sink(&self, entity: &Entity) -> bool {
        self.sink_degree.contains_key(&EntityId::of(entity))
    }
}

/// Errors raised by the post office.
#[derive(Debug, Error, Diagnostic)]
pub enum PostOfficeError {
    /// The exact link is already registered.
    #[error("link {from}:{outbox} -> {sink}:{inbox} is already registered")]
    #[diagnostic(
        code(wiregraph::post_office::link_exists),
        help("Build the post office with `with_link_ignores_duplicates(true)` if idempotent registration is intended.")
    )]
    LinkExists {
        /// Source entity of the duplicate link.
        from: EntityId,
        /// Source mailbox of the duplicate link.
        outbox: Mailbox,
        /// Sink entity of the duplicate link.
        sink: EntityId,
        /// Sink mailbox of the duplicate link.
        inbox: Mailbox,
    },

    /// No registered link matches the source entity and outbox pair.
    #[error("no link registered from {from}:{outbox}")]
    #[diagnostic(
        code(wiregraph::post_office::no_link),
        help("Register the link before posting from it, or build the post office with `with_unlink_ignores_missing(true)` for idempotent removal.")
    )]
    NoLink {
        /// The unmatched source entity.
        from: EntityId,
        /// The unmatched source mailbox.
        outbox: Mailbox,
    },

    /// The entity is not a sink in any registered link.
    #[error("{sink} is not a sink in any registered link")]
    #[diagnostic(
        code(wiregraph::post_office::not_a_sink),
        help("Nothing is wired to deliver messages to this entity; check the container's link set.")
    )]
    NotASink {
        /// The entity that cannot receive messages.
        sink: EntityId,
    },
}
