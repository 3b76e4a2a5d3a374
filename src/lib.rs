//! # Wiregraph: Component-Composition Runtime
//!
//! Wiregraph wires independently-scheduled, message-driven components
//! into directed graphs and runs them cooperatively in a single thread.
//! Components exchange one message per step through named mailboxes; a
//! post office routes emissions along registered links; a round-robin
//! scheduler resumes one component step at a time until the graph has
//! drained and shut itself down.
//!
//! ## Core Concepts
//!
//! - **Components**: step-wise state machines with four standard
//!   mailboxes (`inbox`, `outbox`, `control`, `signal`)
//! - **Links**: directed wiring rules `(source, outbox, sink, inbox)`
//!   consumed by the post office
//! - **Containers**: components composed of other components, exposing a
//!   flattened `coroutines`/`links` view; [`Graphline`] for arbitrary
//!   topology, [`Pipeline`] for linear chains
//! - **Post office**: registers links and fans posted messages out to
//!   sink queues
//! - **Scheduler**: the cooperative main loop, including the
//!   shutdown-cascade protocol
//!
//! [`Graphline`]: containers::Graphline
//! [`Pipeline`]: containers::Pipeline
//!
//! ## Quick Start
//!
//! Chain a producer into a consumer and run the pipeline to completion:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use wiregraph::adapters::{Producer, SinkFn};
//! use wiregraph::component::entity;
//! use wiregraph::containers::Pipeline;
//! use wiregraph::message::{payload, Payload, Text};
//! use wiregraph::post_office::PostOffice;
//! use wiregraph::scheduler::Scheduler;
//!
//! fn main() -> miette::Result<()> {
//!     let source = entity(Producer::new(
//!         (1..=3).map(|n| payload(Text::new(n.to_string()))),
//!     ));
//!
//!     let seen = Rc::new(RefCell::new(Vec::new()));
//!     let log = Rc::clone(&seen);
//!     let sink = entity(SinkFn::new(move |message: Payload| -> Option<Payload> {
//!         if let Some(text) = message.downcast_ref::<Text>() {
//!             log.borrow_mut().push(text.content.clone());
//!         }
//!         None
//!     }));
//!
//!     let pipeline = Pipeline::new([source, sink])?;
//!
//!     let mut scheduler = Scheduler::new(PostOffice::new());
//!     scheduler.register_container(&*pipeline.borrow())?;
//!     scheduler.run(None)?;
//!
//!     // The producer exhausted its input, emitted `ProducerFinished`,
//!     // and the shutdown cascaded through the sink and the pipeline's
//!     // own boundary until the run queue drained.
//!     assert_eq!(*seen.borrow(), ["1", "2", "3"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Shutdown Protocol
//!
//! Cancellation is cooperative and message-driven. Any message whose
//! [`is_shutdown`](message::Message::is_shutdown) classification is true
//! must be relayed on `signal` by whoever receives it, never swallowed.
//! Containers relay it across their boundary and terminate immediately
//! after: shutdown propagates depth-first, and each nesting level
//! finishes only after telling its parent.
//!
//! ## Concurrency Model
//!
//! Single-threaded and cooperative throughout: the scheduler resumes
//! exactly one entity's single step at a time, `coroutines` and `links`
//! are immutable once a container is constructed, and message order is
//! FIFO per link (no ordering is guaranteed across distinct links).
//!
//! ## Module Guide
//!
//! - [`message`] - Message capability, payload handles, concrete kinds
//! - [`mailbox`] - Mailbox names for component ports
//! - [`component`] - Component contract, step outcomes, entity identity
//! - [`links`] - Raw and resolved links, boundary remapping
//! - [`containers`] - Graphline and Pipeline containers
//! - [`post_office`] - Link registration and message delivery
//! - [`scheduler`] - The cooperative main loop
//! - [`adapters`] - Ready-made leaf components

pub mod adapters;
pub mod component;
pub mod containers;
pub mod links;
pub mod mailbox;
pub mod message;
pub mod post_office;
pub mod scheduler;

#[cfg(feature = "petgraph-compat")]
pub mod petgraph_compat;
