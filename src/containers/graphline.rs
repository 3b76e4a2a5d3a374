//! General-topology container built from caller-supplied links.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{collect_entities, resolve_links, Container, ContainerCore};
use crate::component::{Component, Entity, Step, TerminatedError};
use crate::links::{Link, LinkError, RawLink};
use crate::mailbox::Mailbox;
use crate::message::Payload;

/// A container wiring an arbitrary directed graph of components.
///
/// Construction resolves and validates the caller-supplied links,
/// flattens any nested containers, and freezes both the `coroutines`
/// list and the `links` set. The graphline itself is then steppable as
/// an ordinary component: its forwarding state machine bridges the four
/// boundary mailboxes and the internal pass-through mailboxes, and
/// terminates the graphline when a shutdown notice bubbles out through
/// `signal`.
///
/// # Examples
///
/// ```rust
/// use wiregraph::adapters::Passthrough;
/// use wiregraph::component::entity;
/// use wiregraph::containers::{Container, Graphline};
/// use wiregraph::links::{Endpoint, RawLink};
///
/// let worker = entity(Passthrough::new());
/// let graph = Graphline::new([
///     RawLink::new(Endpoint::Boundary, "inbox", &worker, "inbox"),
///     RawLink::new(Endpoint::Boundary, "control", &worker, "control"),
///     RawLink::new(&worker, "outbox", Endpoint::Boundary, "outbox"),
///     RawLink::new(&worker, "signal", Endpoint::Boundary, "signal"),
/// ])?;
///
/// let inner = graph.borrow();
/// assert_eq!(inner.coroutines().len(), 2); // the graphline + the worker
/// assert_eq!(inner.links().len(), 4);
/// # Ok::<(), wiregraph::links::LinkError>(())
/// ```
pub struct Graphline {
    core: ContainerCore,
}

impl Graphline {
    /// Builds a graphline from raw links.
    ///
    /// Links may reference [`Endpoint::Boundary`](crate::links::Endpoint::Boundary)
    /// to wire the graphline's own boundary mailboxes; the boundary
    /// remap table of [`crate::links`] applies. Fails with [`LinkError`]
    /// on the first link that abuses the boundary, leaving nothing
    /// half-initialized.
    pub fn new(
        raw_links: impl IntoIterator<Item = RawLink>,
    ) -> Result<Rc<RefCell<Graphline>>, LinkError> {
        let raw_links: Vec<RawLink> = raw_links.into_iter().collect();
        let links = resolve_links(&raw_links)?;
        let children = collect_entities(&raw_links);
        Ok(Rc::new_cyclic(|weak: &Weak<RefCell<Graphline>>| {
            let this: Weak<RefCell<dyn Component>> = weak.clone();
            RefCell::new(Graphline {
                core: ContainerCore::new(this, children, links),
            })
        }))
    }
}

impl Component for Graphline {
    fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        self.core.forward(inbox, message)
    }

    fn close(&mut self) {
        self.core.close();
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for Graphline {
    fn coroutines(&self) -> Vec<Entity> {
        self.core.coroutines()
    }

    fn links(&self) -> Vec<Link> {
        self.core.links()
    }
}
