//! Containers: components composed of other components.
//!
//! A container owns exactly one ordered, deduplicated list of entities
//! (`coroutines`, index 0 is always the container itself) and one
//! deduplicated set of resolved links. Both become immutable the instant
//! construction succeeds. A container is itself a valid component: it
//! exposes the four standard mailboxes and runs a forwarding state
//! machine between them and its internal pass-through mailboxes, so
//! containers compose into trees of arbitrary depth.
//!
//! Two concrete shapes are provided:
//!
//! - [`Graphline`]: arbitrary topology from caller-supplied links.
//! - [`Pipeline`]: a linear chain with automatic link derivation.
//!
//! Nesting is flattened at construction: a sub-container's coroutines and
//! links are merged (once, identity-deduplicated) into its parent's, so
//! the scheduler and post office never need a concept of nesting.

mod graphline;
mod pipeline;

pub use graphline::Graphline;
pub use pipeline::{ArityError, Pipeline};

use std::cell::RefCell;
use std::rc::Weak;

use rustc_hash::FxHashSet;

use crate::component::{Component, Entity, EntityId, Step, TerminatedError};
use crate::links::{
    remap_boundary_sink, remap_boundary_source, Endpoint, Link, LinkError, RawLink,
};
use crate::mailbox::Mailbox;
use crate::message::Payload;

// ============================================================================
// Container Contract
// ============================================================================

/// Capability exposed by components that contain other components.
///
/// A component that does not implement `Container` is treated as a leaf
/// by the flattening algorithms.
pub trait Container {
    /// All contained entities, flattened and deduplicated, in
    /// deterministic order. Index 0 is the container itself.
    ///
    /// Pass the result to [`Scheduler::register`](crate::scheduler::Scheduler::register).
    fn coroutines(&self) -> Vec<Entity>;

    /// All resolved links, flattened and deduplicated, including those
    /// of nested sub-containers.
    ///
    /// Pass the result to [`PostOffice::register`](crate::post_office::PostOffice::register).
    fn links(&self) -> Vec<Link>;
}

// ============================================================================
// Internal Link Storage
// ============================================================================

/// A resolved link endpoint as stored inside a container.
///
/// The container's own end is kept symbolic so the container does not
/// hold a strong reference to itself; [`ContainerCore::links`]
/// substitutes the live handle on access.
#[derive(Clone)]
enum Port {
    /// This container.
    Local,
    /// Any other entity (including nested sub-containers).
    Remote(Entity),
}

impl Port {
    fn key(&self) -> PortKey {
        match self {
            Self::Local => PortKey::Local,
            Self::Remote(entity) => PortKey::Remote(EntityId::of(entity)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum PortKey {
    Local,
    Remote(EntityId),
}

#[derive(Clone)]
struct StoredLink {
    source: Port,
    source_mailbox: Mailbox,
    sink: Port,
    sink_mailbox: Mailbox,
}

impl StoredLink {
    fn key(&self) -> (PortKey, Mailbox, PortKey, Mailbox) {
        (
            self.source.key(),
            self.source_mailbox.clone(),
            self.sink.key(),
            self.sink_mailbox.clone(),
        )
    }
}

// ============================================================================
// Shared Container Core
// ============================================================================

/// State shared by every container shape: the flattened entity list, the
/// resolved link set, and the forwarding state machine that makes the
/// container steppable as an ordinary component.
pub(crate) struct ContainerCore {
    /// Handle to the container's own cell. Weak, so a container never
    /// keeps itself alive through its own link set.
    this: Weak<RefCell<dyn Component>>,
    /// Flattened children in deterministic order, excluding the
    /// container itself.
    children: Vec<Entity>,
    links: Vec<StoredLink>,
    terminated: bool,
}

impl ContainerCore {
    pub(crate) fn new(
        this: Weak<RefCell<dyn Component>>,
        children: Vec<Entity>,
        links: ResolvedLinks,
    ) -> Self {
        Self {
            this,
            children,
            links: links.0,
            terminated: false,
        }
    }

    /// The container's own entity handle.
    ///
    /// The upgrade cannot fail while any caller holds the container:
    /// `this` points at the very allocation the caller reached us
    /// through.
    fn this_entity(&self) -> Entity {
        self.this
            .upgrade()
            .expect("container cell is alive while its core is borrowed")
    }

    pub(crate) fn coroutines(&self) -> Vec<Entity> {
        let mut out = Vec::with_capacity(self.children.len() + 1);
        out.push(self.this_entity());
        out.extend(self.children.iter().cloned());
        out
    }

    pub(crate) fn links(&self) -> Vec<Link> {
        let this = self.this_entity();
        self.links
            .iter()
            .map(|stored| {
                let source = match &stored.source {
                    Port::Local => this.clone(),
                    Port::Remote(entity) => entity.clone(),
                };
                let sink = match &stored.sink {
                    Port::Local => this.clone(),
                    Port::Remote(entity) => entity.clone(),
                };
                Link {
                    source,
                    source_mailbox: stored.source_mailbox.clone(),
                    sink,
                    sink_mailbox: stored.sink_mailbox.clone(),
                }
            })
            .collect()
    }

    /// One step of the forwarding state machine.
    ///
    /// Transition table, keyed by incoming mailbox:
    ///
    /// | incoming            | outgoing         |
    /// |---------------------|------------------|
    /// | `control`           | `_signalToChild` |
    /// | `_inboxFromChild`   | `outbox`         |
    /// | `_controlFromChild` | `signal`         |
    /// | anything else       | `_outboxToChild` |
    ///
    /// A shutdown-classified message bound for `signal` is relayed one
    /// final time and the container terminates: shutdown propagates
    /// depth-first, and each level finishes only after telling its
    /// parent.
    pub(crate) fn forward(
        &mut self,
        inbox: Mailbox,
        message: Payload,
    ) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        let outbox = match inbox {
            Mailbox::Control => Mailbox::SignalToChild,
            Mailbox::InboxFromChild => Mailbox::Outbox,
            Mailbox::ControlFromChild => Mailbox::Signal,
            _ => Mailbox::OutboxToChild,
        };
        if outbox == Mailbox::Signal && message.is_shutdown() {
            self.terminated = true;
            return Ok(Step::Final(outbox, message));
        }
        Ok(Step::Emit(outbox, message))
    }

    pub(crate) fn close(&mut self) {
        self.terminated = true;
    }
}

/// Link set produced by [`resolve_links`]; frozen once computed.
pub(crate) struct ResolvedLinks(Vec<StoredLink>);

// ============================================================================
// Link Resolution
// ============================================================================

/// Turn caller-supplied raw links into the canonical link set of one
/// container.
///
/// Validates boundary usage, applies the remap table, and unions the
/// already-resolved link sets of any sub-containers referenced by the
/// raw links (the post office has no concept of nesting, so nested
/// wiring must surface at the top level). Set semantics: re-adding an
/// identical link is a no-op. Fails on the first invalid link; inputs
/// are never mutated.
pub(crate) fn resolve_links(raw_links: &[RawLink]) -> Result<ResolvedLinks, LinkError> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    let push = |seen: &mut FxHashSet<_>, out: &mut Vec<StoredLink>, link: StoredLink| {
        if seen.insert(link.key()) {
            out.push(link);
        }
    };

    for raw in raw_links {
        let (source, source_mailbox) = match &raw.source {
            Endpoint::Boundary => {
                if matches!(raw.source_mailbox, Mailbox::Outbox | Mailbox::Signal) {
                    return Err(LinkError::SelfSource {
                        mailbox: raw.source_mailbox.clone(),
                    });
                }
                (Port::Local, remap_boundary_source(raw.source_mailbox.clone()))
            }
            Endpoint::Ref(entity) => (Port::Remote(entity.clone()), raw.source_mailbox.clone()),
        };
        let (sink, sink_mailbox) = match &raw.sink {
            Endpoint::Boundary => {
                if matches!(raw.sink_mailbox, Mailbox::Inbox | Mailbox::Control) {
                    return Err(LinkError::SelfSink {
                        mailbox: raw.sink_mailbox.clone(),
                    });
                }
                (Port::Local, remap_boundary_sink(raw.sink_mailbox.clone()))
            }
            Endpoint::Ref(entity) => (Port::Remote(entity.clone()), raw.sink_mailbox.clone()),
        };
        push(
            &mut seen,
            &mut out,
            StoredLink {
                source,
                source_mailbox,
                sink,
                sink_mailbox,
            },
        );

        // Surface the internal wiring of any sub-container this link
        // touches. Sub-container link sets are already flattened, so one
        // level of union covers arbitrary nesting depth.
        for endpoint in [&raw.source, &raw.sink] {
            let Some(entity) = endpoint.entity() else {
                continue;
            };
            let nested = {
                let component = entity.borrow();
                component.as_container().map(Container::links)
            };
            for link in nested.into_iter().flatten() {
                push(
                    &mut seen,
                    &mut out,
                    StoredLink {
                        source: Port::Remote(link.source),
                        source_mailbox: link.source_mailbox,
                        sink: Port::Remote(link.sink),
                        sink_mailbox: link.sink_mailbox,
                    },
                );
            }
        }
    }
    Ok(ResolvedLinks(out))
}

// ============================================================================
// Entity Flattening
// ============================================================================

/// Compute the flattened child list of a graphline, in first-seen link
/// order. The container itself is prepended later by
/// [`ContainerCore::coroutines`].
pub(crate) fn collect_entities(raw_links: &[RawLink]) -> Vec<Entity> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for raw in raw_links {
        for endpoint in [&raw.source, &raw.sink] {
            if let Some(entity) = endpoint.entity() {
                admit(&mut out, &mut seen, entity);
            }
        }
    }
    out
}

/// Compute the flattened child list of a pipeline: the caller-supplied
/// sequence in declared order, with each sub-container's coroutines
/// inlined immediately after their parent.
///
/// Round-robin fairness under the scheduler requires a sub-container's
/// steps to be scheduled adjacent to its parent's position, not wherever
/// link traversal happens to discover it.
pub(crate) fn collect_entities_ordered(sequence: &[Entity]) -> Vec<Entity> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for entity in sequence {
        admit(&mut out, &mut seen, entity);
    }
    out
}

/// Append `entity` if unseen, then inline its sub-container coroutines
/// (if any) that are not yet present, in the sub-container's own order.
fn admit(out: &mut Vec<Entity>, seen: &mut FxHashSet<EntityId>, entity: &Entity) {
    if seen.insert(EntityId::of(entity)) {
        out.push(entity.clone());
    }
    let nested = {
        let component = entity.borrow();
        component.as_container().map(Container::coroutines)
    };
    // The first entry of a nested list is the sub-container itself,
    // which the dedup guard above already admitted.
    for child in nested.into_iter().flatten() {
        if seen.insert(EntityId::of(&child)) {
            out.push(child);
        }
    }
}
