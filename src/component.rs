//! The component contract: the minimal capability every schedulable
//! unit must satisfy.
//!
//! A component is an explicit two-method state machine: the scheduler
//! delivers one `(mailbox, message)` pair per [`step`](Component::step)
//! and receives back at most one emission, then the component suspends
//! until its next step. Components are closable, throw-compatible, and
//! identified by reference: two handles to the "same" component are the
//! same [`Entity`]; value comparison of components is never performed.
//!
//! # Examples
//!
//! ```rust
//! use wiregraph::component::{entity, Component, Step, TerminatedError};
//! use wiregraph::mailbox::Mailbox;
//! use wiregraph::message::Payload;
//!
//! /// Echoes inbox traffic back out, relaying shutdown like every
//! /// well-behaved component.
//! struct Echo {
//!     terminated: bool,
//! }
//!
//! impl Component for Echo {
//!     fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
//!         if self.terminated {
//!             return Err(TerminatedError);
//!         }
//!         if message.is_shutdown() {
//!             self.terminated = true;
//!             return Ok(Step::Final(Mailbox::Signal, message));
//!         }
//!         match inbox {
//!             Mailbox::Inbox => Ok(Step::Emit(Mailbox::Outbox, message)),
//!             _ => Ok(Step::Idle),
//!         }
//!     }
//!
//!     fn close(&mut self) {
//!         self.terminated = true;
//!     }
//! }
//!
//! let echo = entity(Echo { terminated: false });
//! let other = echo.clone();
//! // Identity, not value: both handles name the same entity.
//! assert_eq!(
//!     wiregraph::component::EntityId::of(&echo),
//!     wiregraph::component::EntityId::of(&other),
//! );
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use miette::Diagnostic;
use thiserror::Error;

use crate::containers::Container;
use crate::mailbox::Mailbox;
use crate::message::Payload;

// ============================================================================
// Step Outcome
// ============================================================================

/// Outcome of advancing a component by one step.
#[derive(Clone)]
pub enum Step {
    /// One `(mailbox, message)` emission; the component stays runnable.
    Emit(Mailbox, Payload),
    /// Nothing to send this step; the component stays runnable.
    Idle,
    /// One final emission; the component has reached its terminal state.
    Final(Mailbox, Payload),
    /// Terminal state reached without an emission.
    Stop,
}

impl Step {
    /// Returns `true` if this step ended the component's lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Final(..) | Self::Stop)
    }

    /// The emission carried by this step, if any.
    #[must_use]
    pub fn emission(&self) -> Option<(&Mailbox, &Payload)> {
        match self {
            Self::Emit(mailbox, message) | Self::Final(mailbox, message) => {
                Some((mailbox, message))
            }
            Self::Idle | Self::Stop => None,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emit(mailbox, _) => write!(f, "Emit({mailbox}, ..)"),
            Self::Idle => write!(f, "Idle"),
            Self::Final(mailbox, _) => write!(f, "Final({mailbox}, ..)"),
            Self::Stop => write!(f, "Stop"),
        }
    }
}

// ============================================================================
// Errors & Faults
// ============================================================================

/// A step was attempted against an entity that has already reached its
/// terminal state.
#[derive(Debug, Error, Diagnostic)]
#[error("component has terminated and accepts no further steps")]
#[diagnostic(
    code(wiregraph::component::terminated),
    help("The scheduler removes finished entities from its run queue; do not step an entity after it emitted a final message or was closed.")
)]
pub struct TerminatedError;

/// An external fault injected into a suspended component via
/// [`Component::throw`].
pub type Fault = miette::Report;

// ============================================================================
// Component Contract
// ============================================================================

/// Core trait defining a schedulable, message-driven unit.
///
/// The contract is cooperative and single-threaded: the scheduler resumes
/// exactly one entity's single step at a time, and a step always runs to
/// completion before the next step of any entity begins.
pub trait Component {
    /// Advance the component by one step.
    ///
    /// Receives one `(mailbox, message)` pair and returns at most one
    /// emission. A shutdown-classified message must be re-emitted on
    /// `signal` (never swallowed), normally via [`Step::Final`].
    fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError>;

    /// Terminate the component.
    ///
    /// Idempotent. After `close`, every subsequent `step` must fail with
    /// [`TerminatedError`].
    fn close(&mut self);

    /// Inject a fault into the suspended component.
    ///
    /// The component may absorb the fault and return a normal step
    /// result, or let it propagate. The default closes the component and
    /// propagates.
    fn throw(&mut self, fault: Fault) -> Result<Step, Fault> {
        self.close();
        Err(fault)
    }

    /// Whether the scheduler should run this component only when
    /// messages are queued for it.
    ///
    /// Lazy by default; producers return `false` and receive
    /// `(control, Tick)` pokes when idle.
    fn lazy(&self) -> bool {
        true
    }

    /// Container capability check; `None` marks a leaf component.
    fn as_container(&self) -> Option<&dyn Container> {
        None
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Shared handle to a schedulable component.
///
/// Entities are compared by identity, never by value: the same component
/// referenced from two places is one entity, and deduplication in
/// containers is identity-based.
pub type Entity = Rc<RefCell<dyn Component>>;

/// Wrap a component into a shareable [`Entity`] handle.
#[must_use]
pub fn entity(component: impl Component + 'static) -> Entity {
    Rc::new(RefCell::new(component))
}

/// Identity key for an [`Entity`].
///
/// Derived from the handle's allocation address, so it is stable for the
/// life of the entity and distinct between any two live entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    /// The identity of the given entity.
    #[must_use]
    pub fn of(entity: &Entity) -> Self {
        Self(Rc::as_ptr(entity) as *const () as usize)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{payload, Text};

    struct Nop {
        closed: bool,
    }

    impl Component for Nop {
        fn step(&mut self, _inbox: Mailbox, _message: Payload) -> Result<Step, TerminatedError> {
            if self.closed {
                return Err(TerminatedError);
            }
            Ok(Step::Idle)
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn entity_identity_is_per_allocation() {
        let a = entity(Nop { closed: false });
        let b = entity(Nop { closed: false });
        assert_ne!(EntityId::of(&a), EntityId::of(&b));
        assert_eq!(EntityId::of(&a), EntityId::of(&a.clone()));
    }

    #[test]
    fn default_throw_closes_and_propagates() {
        let mut nop = Nop { closed: false };
        let fault = miette::miette!("boom");
        assert!(nop.throw(fault).is_err());
        assert!(nop
            .step(Mailbox::Inbox, payload(Text::new("x")))
            .is_err());
    }

    #[test]
    fn step_emission_accessor() {
        let step = Step::Emit(Mailbox::Outbox, payload(Text::new("x")));
        let (mailbox, _) = step.emission().unwrap();
        assert_eq!(*mailbox, Mailbox::Outbox);
        assert!(!step.is_terminal());
        assert!(Step::Stop.is_terminal());
        assert!(Step::Stop.emission().is_none());
    }
}
