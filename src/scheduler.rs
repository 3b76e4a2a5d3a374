//! The scheduler: the cooperative main loop.
//!
//! The scheduler owns a [`PostOffice`] and a round-robin run queue of
//! registered entities. One [`step`](Scheduler::step) runs exactly one
//! entity for all messages currently queued for it, posting every
//! resulting emission back to the post office; one
//! [`cycle`](Scheduler::cycle) gives every queued entity one step; and
//! [`run`](Scheduler::run) repeats cycles until the run queue empties or
//! a cycle budget is spent.
//!
//! Everything is single-threaded and cooperative: a step always runs to
//! completion before any other entity is resumed, so no locks are
//! involved anywhere.
//!
//! # Shutdown protocol
//!
//! When an entity emits a shutdown-classified message on its `signal`
//! mailbox it enters the shutting-down state: the scheduler stops
//! delivering post office traffic to it and instead sends one
//! `(control, Shutdown)` per step until the entity finishes, so lazy
//! entities always receive enough messages to terminate cleanly. A
//! shutdown emission with nothing wired downstream is discarded rather
//! than treated as an error; sinks at the edge of the graph announce
//! their termination the same way everything else does.

use std::collections::VecDeque;

use miette::Diagnostic;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::component::{Entity, EntityId, Step, TerminatedError};
use crate::containers::Container;
use crate::mailbox::Mailbox;
use crate::message::{payload, Payload, Shutdown, Tick};
use crate::post_office::{PostOffice, PostOfficeError};

/// Runs registered entities round-robin, moving messages through the
/// post office between steps.
pub struct Scheduler {
    post_office: PostOffice,
    run_queue: VecDeque<Entity>,
    registered: FxHashSet<EntityId>,
    shutting_down: FxHashSet<EntityId>,
    add_ignores_duplicates: bool,
    remove_ignores_missing: bool,
}

impl Scheduler {
    /// Creates a scheduler over the given post office.
    #[must_use]
    pub fn new(post_office: PostOffice) -> Self {
        Self {
            post_office,
            run_queue: VecDeque::new(),
            registered: FxHashSet::default(),
            shutting_down: FxHashSet::default(),
            add_ignores_duplicates: false,
            remove_ignores_missing: false,
        }
    }

    /// Makes [`register`](Self::register) idempotent for already-added
    /// entities.
    #[must_use]
    pub fn with_add_ignores_duplicates(mut self, yes: bool) -> Self {
        self.add_ignores_duplicates = yes;
        self
    }

    /// Makes [`unregister`](Self::unregister) idempotent for entities
    /// that were never added.
    #[must_use]
    pub fn with_remove_ignores_missing(mut self, yes: bool) -> Self {
        self.remove_ignores_missing = yes;
        self
    }

    /// The post office this scheduler posts to and retrieves from.
    #[must_use]
    pub fn post_office(&self) -> &PostOffice {
        &self.post_office
    }

    /// Mutable access to the post office, e.g. for registering links.
    pub fn post_office_mut(&mut self) -> &mut PostOffice {
        &mut self.post_office
    }

    /// Whether the run queue is empty.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.run_queue.is_empty()
    }

    /// Adds an entity to the run queue.
    pub fn register(&mut self, entity: Entity) -> Result<(), SchedulerError> {
        let id = EntityId::of(&entity);
        if !self.registered.insert(id) {
            if self.add_ignores_duplicates {
                return Ok(());
            }
            return Err(SchedulerError::Duplicate { entity: id });
        }
        self.run_queue.push_back(entity);
        Ok(())
    }

    /// Registers a container wholesale: all of its coroutines with this
    /// scheduler and all of its links with the post office.
    pub fn register_container(&mut self, container: &dyn Container) -> Result<(), SchedulerError> {
        for entity in container.coroutines() {
            self.register(entity)?;
        }
        self.post_office.register_all(container.links().iter())?;
        Ok(())
    }

    /// Removes an entity from the run queue and closes it. Nothing is
    /// ever sent to it again.
    pub fn unregister(&mut self, entity: &Entity) -> Result<(), SchedulerError> {
        let id = EntityId::of(entity);
        if !self.registered.remove(&id) {
            if self.remove_ignores_missing {
                return Ok(());
            }
            return Err(SchedulerError::NotAdded { entity: id });
        }
        self.run_queue.retain(|queued| EntityId::of(queued) != id);
        self.shutting_down.remove(&id);
        entity.borrow_mut().close();
        Ok(())
    }

    /// Runs exactly one entity for all messages currently queued for it.
    ///
    /// Lazy entities with nothing queued are skipped; eager entities
    /// receive one `(control, Tick)` poke instead. A lazy entity the
    /// post office does not even know as a sink could never be run and
    /// fails with [`SchedulerError::NeverRun`].
    pub fn step(&mut self) -> Result<(), SchedulerError> {
        let Some(entity) = self.run_queue.pop_front() else {
            return Ok(());
        };
        let id = EntityId::of(&entity);
        let lazy = entity.borrow().lazy();

        let batch: Vec<(Mailbox, Payload)> = if self.shutting_down.contains(&id) {
            // No more post office traffic; keep nudging until it exits.
            vec![(Mailbox::Control, payload(Shutdown))]
        } else {
            let mail = match self.post_office.retrieve(&entity) {
                Ok(mail) => mail,
                Err(PostOfficeError::NotASink { .. }) if !lazy => Vec::new(),
                Err(PostOfficeError::NotASink { .. }) => {
                    self.run_queue.push_back(entity);
                    return Err(SchedulerError::NeverRun { entity: id });
                }
                Err(err) => return Err(err.into()),
            };
            if mail.is_empty() {
                if lazy {
                    tracing::trace!(entity = %id, "lazy entity has no mail; skipping");
                    self.run_queue.push_back(entity);
                    return Ok(());
                }
                vec![(Mailbox::Control, payload(Tick))]
            } else {
                mail
            }
        };

        let mut finished = false;
        for (inbox, message) in batch {
            let outcome = entity.borrow_mut().step(inbox, message);
            let step = match outcome {
                Ok(step) => step,
                Err(TerminatedError) => {
                    finished = true;
                    break;
                }
            };
            match step {
                Step::Idle => {}
                Step::Emit(outbox, message) => self.dispatch(&entity, id, outbox, message)?,
                Step::Final(outbox, message) => {
                    self.dispatch(&entity, id, outbox, message)?;
                    finished = true;
                    break;
                }
                Step::Stop => {
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.finish(&entity, id);
        } else {
            self.run_queue.push_back(entity);
        }
        Ok(())
    }

    /// One pass of [`step`](Self::step) over every entity currently in
    /// the run queue.
    pub fn cycle(&mut self) -> Result<(), SchedulerError> {
        for _ in 0..self.run_queue.len() {
            if self.run_queue.is_empty() {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// The main loop.
    ///
    /// With `None`, cycles until the run queue is empty. With `Some(n)`,
    /// runs `n` cycles and returns; a subsequent call resumes where the
    /// previous one left off.
    #[tracing::instrument(skip(self), fields(entities = self.run_queue.len()))]
    pub fn run(&mut self, cycles: Option<usize>) -> Result<(), SchedulerError> {
        match cycles {
            Some(n) => {
                for _ in 0..n {
                    if self.is_idle() {
                        break;
                    }
                    self.cycle()?;
                }
            }
            None => {
                while !self.is_idle() {
                    self.cycle()?;
                }
            }
        }
        Ok(())
    }

    /// Posts one emission, tracking shutdown state.
    fn dispatch(
        &mut self,
        entity: &Entity,
        id: EntityId,
        outbox: Mailbox,
        message: Payload,
    ) -> Result<(), SchedulerError> {
        let shutdown = message.is_shutdown();
        match self.post_office.post(entity, outbox.clone(), message) {
            Ok(()) => {}
            Err(PostOfficeError::NoLink { .. }) if shutdown => {
                // Sinks at the edge of the graph announce shutdown with
                // nothing wired downstream.
                tracing::debug!(entity = %id, %outbox, "discarding unroutable shutdown message");
            }
            Err(err) => return Err(err.into()),
        }
        if shutdown && outbox == Mailbox::Signal {
            self.shutting_down.insert(id);
        }
        Ok(())
    }

    /// Removes a finished entity from all bookkeeping and closes it.
    fn finish(&mut self, entity: &Entity, id: EntityId) {
        tracing::debug!(entity = %id, "entity finished");
        self.registered.remove(&id);
        self.shutting_down.remove(&id);
        entity.borrow_mut().close();
    }
}

/// Errors raised by the scheduler.
#[derive(Debug, Error, Diagnostic)]
pub enum SchedulerError {
    /// The entity is already registered.
    #[error("{entity} is already registered with the scheduler")]
    #[diagnostic(
        code(wiregraph::scheduler::duplicate),
        help("Build the scheduler with `with_add_ignores_duplicates(true)` if idempotent registration is intended.")
    )]
    Duplicate {
        /// The doubly-registered entity.
        entity: EntityId,
    },

    /// The entity was never registered.
    #[error("{entity} is not registered with the scheduler")]
    #[diagnostic(
        code(wiregraph::scheduler::not_added),
        help("Build the scheduler with `with_remove_ignores_missing(true)` if idempotent removal is intended.")
    )]
    NotAdded {
        /// The unknown entity.
        entity: EntityId,
    },

    /// A lazy entity has no link delivering messages to it, so it could
    /// never be run.
    #[error("{entity} is lazy but no link delivers messages to it; it can never run")]
    #[diagnostic(
        code(wiregraph::scheduler::never_run),
        help("Link something to the entity's inbox or control mailbox, or make the component eager.")
    )]
    NeverRun {
        /// The unreachable entity.
        entity: EntityId,
    },

    /// A post office operation failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    PostOffice(#[from] PostOfficeError),
}
