//! Linear-chain container with automatic link derivation.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use miette::Diagnostic;
use thiserror::Error;

use super::{collect_entities_ordered, resolve_links, Container, ContainerCore};
use crate::component::{Component, Entity, Step, TerminatedError};
use crate::links::{Endpoint, Link, RawLink};
use crate::mailbox::Mailbox;
use crate::message::Payload;

/// A pipeline was given fewer than two components.
#[derive(Debug, Error, Diagnostic)]
#[error("a pipeline needs at least two components, got {got}")]
#[diagnostic(
    code(wiregraph::pipeline::arity),
    help("Schedule a single component directly, or wrap it in a Graphline if it needs a container boundary.")
)]
pub struct ArityError {
    /// How many components were supplied.
    pub got: usize,
}

/// A container chaining components into a linear sequence.
///
/// For every adjacent pair `(a, b)` the pipeline derives the links
/// `(a, outbox, b, inbox)` and `(a, signal, b, control)`, then wires its
/// own boundary: `inbox`/`control` feed the first stage, `outbox`/
/// `signal` are fed by the last. Link resolution, flattening, and the
/// forwarding state machine are exactly those of [`Graphline`]; only
/// coroutine collection differs: stages appear in declared order, with
/// nested sub-container coroutines inlined immediately after their
/// parent, so the scheduler's round-robin visits a sub-container's steps
/// adjacent to its position in the chain.
///
/// [`Graphline`]: super::Graphline
///
/// # Examples
///
/// ```rust
/// use wiregraph::adapters::Passthrough;
/// use wiregraph::component::entity;
/// use wiregraph::containers::{Container, Pipeline};
///
/// let first = entity(Passthrough::new());
/// let second = entity(Passthrough::new());
/// let pipeline = Pipeline::new([first, second])?;
///
/// let inner = pipeline.borrow();
/// assert_eq!(inner.coroutines().len(), 3); // the pipeline + both stages
/// assert_eq!(inner.links().len(), 6); // one chain pair + four boundary links
/// # Ok::<(), wiregraph::containers::ArityError>(())
/// ```
pub struct Pipeline {
    core: ContainerCore,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Builds a pipeline from an ordered sequence of components.
    ///
    /// Fails with [`ArityError`] when fewer than two components are
    /// supplied.
    pub fn new(
        stages: impl IntoIterator<Item = Entity>,
    ) -> Result<Rc<RefCell<Pipeline>>, ArityError> {
        let stages: Vec<Entity> = stages.into_iter().collect();
        if stages.len() < 2 {
            return Err(ArityError { got: stages.len() });
        }

        let mut raw_links = Vec::with_capacity(stages.len() * 2 + 2);
        for pair in stages.windows(2) {
            raw_links.push(RawLink::new(&pair[0], "outbox", &pair[1], "inbox"));
            raw_links.push(RawLink::new(&pair[0], "signal", &pair[1], "control"));
        }
        let first = &stages[0];
        let last = &stages[stages.len() - 1];
        raw_links.push(RawLink::new(Endpoint::Boundary, "inbox", first, "inbox"));
        raw_links.push(RawLink::new(Endpoint::Boundary, "control", first, "control"));
        raw_links.push(RawLink::new(last, "outbox", Endpoint::Boundary, "outbox"));
        raw_links.push(RawLink::new(last, "signal", Endpoint::Boundary, "signal"));

        // Derived links only ever use the boundary as an inward source
        // or outward sink, so validation cannot fail here.
        let links = resolve_links(&raw_links)
            .expect("derived pipeline links never abuse the boundary");
        let children = collect_entities_ordered(&stages);
        Ok(Rc::new_cyclic(|weak: &Weak<RefCell<Pipeline>>| {
            let this: Weak<RefCell<dyn Component>> = weak.clone();
            RefCell::new(Pipeline {
                core: ContainerCore::new(this, children, links),
            })
        }))
    }
}

impl Component for Pipeline {
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

impl Container for Pipeline {
    fn coroutines(&self) -> Vec<Entity> {
        self.core.coroutines()
    }

    fn links(&self) -> Vec<Link> {
        self.core.links()
    }
}
