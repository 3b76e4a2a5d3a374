//! Links: directed wiring rules between mailboxes.
//!
//! A link connects one entity's outbox to another entity's inbox. Links
//! come in two forms:
//!
//! - [`RawLink`]: caller-supplied, where either end may be the
//!   [`Endpoint::Boundary`] marker meaning "this container's own boundary
//!   mailbox".
//! - [`Link`]: resolved at container construction time; the boundary
//!   marker is replaced by a reference to the container itself and the
//!   boundary mailbox names are remapped to the container's internal
//!   pass-through mailboxes.
//!
//! Links compare by full tuple value (with entities compared by
//! identity); a set of links is duplicate-free by definition.
//!
//! # Boundary remap table
//!
//! | endpoint            | mailbox   | becomes             |
//! |---------------------|-----------|---------------------|
//! | boundary as source  | `inbox`   | `_outboxToChild`    |
//! | boundary as source  | `control` | `_signalToChild`    |
//! | boundary as sink    | `outbox`  | `_inboxFromChild`   |
//! | boundary as sink    | `signal`  | `_controlFromChild` |
//!
//! Any other mailbox name used with the boundary passes through
//! unchanged, allowing a container to wire a custom mailbox pair to
//! itself.

use std::fmt;
use std::hash::{Hash, Hasher};

use miette::Diagnostic;
use thiserror::Error;

use crate::component::{Entity, EntityId};
use crate::mailbox::Mailbox;

// ============================================================================
// Endpoints & Raw Links
// ============================================================================

/// One end of a raw link: a concrete entity, or the boundary of the
/// container under construction.
#[derive(Clone)]
pub enum Endpoint {
    /// The container being built; resolved into a reference to the
    /// container itself.
    Boundary,
    /// A concrete entity.
    Ref(Entity),
}

impl Endpoint {
    /// Returns `true` if this endpoint is the boundary marker.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary)
    }

    /// The entity behind this endpoint, unless it is the boundary.
    #[must_use]
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Self::Boundary => None,
            Self::Ref(entity) => Some(entity),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary => write!(f, "Boundary"),
            Self::Ref(entity) => write!(f, "Ref({})", EntityId::of(entity)),
        }
    }
}

impl From<&Entity> for Endpoint {
    fn from(entity: &Entity) -> Self {
        Self::Ref(entity.clone())
    }
}

impl From<Entity> for Endpoint {
    fn from(entity: Entity) -> Self {
        Self::Ref(entity)
    }
}

/// Caller-supplied wiring rule; either end may reference the container
/// boundary.
#[derive(Clone, Debug)]
pub struct RawLink {
    /// The emitting end.
    pub source: Endpoint,
    /// The mailbox the source emits on.
    pub source_mailbox: Mailbox,
    /// The receiving end.
    pub sink: Endpoint,
    /// The mailbox the sink receives on.
    pub sink_mailbox: Mailbox,
}

impl RawLink {
    /// Creates a raw link.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wiregraph::adapters::Passthrough;
    /// use wiregraph::component::entity;
    /// use wiregraph::links::{Endpoint, RawLink};
    ///
    /// let worker = entity(Passthrough::new());
    /// let inward = RawLink::new(Endpoint::Boundary, "inbox", &worker, "inbox");
    /// assert!(inward.source.is_boundary());
    /// ```
    #[must_use]
    pub fn new(
        source: impl Into<Endpoint>,
        source_mailbox: impl Into<Mailbox>,
        sink: impl Into<Endpoint>,
        sink_mailbox: impl Into<Mailbox>,
    ) -> Self {
        Self {
            source: source.into(),
            source_mailbox: source_mailbox.into(),
            sink: sink.into(),
            sink_mailbox: sink_mailbox.into(),
        }
    }
}

// ============================================================================
// Resolved Links
// ============================================================================

/// Value key identifying a resolved link: entities by identity,
/// mailboxes by name.
pub type LinkKey = (EntityId, Mailbox, EntityId, Mailbox);

/// A resolved, immutable wiring rule consumed by the post office.
#[derive(Clone)]
pub struct Link {
    /// The emitting entity.
    pub source: Entity,
    /// The mailbox the source emits on.
    pub source_mailbox: Mailbox,
    /// The receiving entity.
    pub sink: Entity,
    /// The mailbox the sink receives on.
    pub sink_mailbox: Mailbox,
}

impl Link {
    /// Creates a resolved link between two entities.
    #[must_use]
    pub fn new(
        source: &Entity,
        source_mailbox: impl Into<Mailbox>,
        sink: &Entity,
        sink_mailbox: impl Into<Mailbox>,
    ) -> Self {
        Self {
            source: source.clone(),
            source_mailbox: source_mailbox.into(),
            sink: sink.clone(),
            sink_mailbox: sink_mailbox.into(),
        }
    }

    /// The full tuple key by which links compare.
    #[must_use]
    pub fn key(&self) -> LinkKey {
        (
            EntityId::of(&self.source),
            self.source_mailbox.clone(),
            EntityId::of(&self.sink),
            self.sink_mailbox.clone(),
        )
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            EntityId::of(&self.source),
            self.source_mailbox,
            EntityId::of(&self.sink),
            self.sink_mailbox,
        )
    }
}

// ============================================================================
// Boundary Remapping
// ============================================================================

/// Remap applied when the boundary is a link's source.
pub(crate) fn remap_boundary_source(mailbox: Mailbox) -> Mailbox {
    match mailbox {
        Mailbox::Inbox => Mailbox::OutboxToChild,
        Mailbox::Control => Mailbox::SignalToChild,
        other => other,
    }
}

/// Remap applied when the boundary is a link's sink.
pub(crate) fn remap_boundary_sink(mailbox: Mailbox) -> Mailbox {
    match mailbox {
        Mailbox::Outbox => Mailbox::InboxFromChild,
        Mailbox::Signal => Mailbox::ControlFromChild,
        other => other,
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A raw link abused the boundary marker in a way that would create a
/// direction conflict.
///
/// Always fatal to the construction call that raised it; no container is
/// left half-initialized.
#[derive(Debug, Error, Diagnostic)]
pub enum LinkError {
    /// The boundary's `outbox`/`signal` already carry the container's
    /// outward traffic; they cannot also source an inward pass-through.
    #[error("boundary mailbox `{mailbox}` cannot be the source of a pass-through link")]
    #[diagnostic(
        code(wiregraph::links::self_source),
        help("Use `inbox` or `control` (or a custom name) when the boundary is the source; `outbox` and `signal` are owned by the container's outward direction.")
    )]
    SelfSource {
        /// The offending source mailbox.
        mailbox: Mailbox,
    },

    /// The boundary's `inbox`/`control` already carry the container's
    /// inward traffic; they cannot also sink an outward pass-through.
    #[error("boundary mailbox `{mailbox}` cannot be the sink of a pass-through link")]
    #[diagnostic(
        code(wiregraph::links::self_sink),
        help("Use `outbox` or `signal` (or a custom name) when the boundary is the sink; `inbox` and `control` are owned by the container's inward direction.")
    )]
    SelfSink {
        /// The offending sink mailbox.
        mailbox: Mailbox,
    },
}
