//! Shared fixtures for integration tests: payload helpers and small
//! purpose-built components.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use wiregraph::adapters::{Producer, SinkFn};
use wiregraph::component::{entity, Component, Entity, EntityId, Step, TerminatedError};
use wiregraph::mailbox::Mailbox;
use wiregraph::message::{payload, Payload, Shutdown, Text};

/// Wrap a string into a [`Text`] payload.
pub fn text(content: &str) -> Payload {
    payload(Text::new(content))
}

/// Recover the string of a [`Text`] payload, if it is one.
pub fn text_of(message: &Payload) -> Option<String> {
    message.downcast_ref::<Text>().map(|t| t.content.clone())
}

/// Identity keys of a slice of entities, in order.
pub fn ids(entities: &[Entity]) -> Vec<EntityId> {
    entities.iter().map(EntityId::of).collect()
}

/// A producer entity yielding the given strings as [`Text`] payloads.
pub fn producer_of(items: &[&str]) -> Entity {
    let payloads: Vec<Payload> = items.iter().map(|s| text(s)).collect();
    entity(Producer::new(payloads.into_iter()))
}

/// A sink entity that appends every [`Text`] it consumes to the returned
/// shared log.
pub fn collecting_sink() -> (Entity, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink_log = Rc::clone(&log);
    let sink = entity(SinkFn::new(move |message: Payload| -> Option<Payload> {
        if let Some(content) = text_of(&message) {
            sink_log.borrow_mut().push(content);
        }
        None
    }));
    (sink, log)
}

/// Eager component that counts the pokes it receives and otherwise stays
/// idle.
pub struct TickCounter {
    pub ticks: Rc<RefCell<usize>>,
    terminated: bool,
}

impl TickCounter {
    pub fn new() -> (Entity, Rc<RefCell<usize>>) {
        let ticks = Rc::new(RefCell::new(0));
        let counter = Self {
            ticks: Rc::clone(&ticks),
            terminated: false,
        };
        (entity(counter), ticks)
    }
}

impl Component for TickCounter {
    fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        if message.is_shutdown() {
            self.terminated = true;
            return Ok(Step::Stop);
        }
        if inbox == Mailbox::Control {
            *self.ticks.borrow_mut() += 1;
        }
        Ok(Step::Idle)
    }

    fn close(&mut self) {
        self.terminated = true;
    }

    fn lazy(&self) -> bool {
        false
    }
}

/// Eager component that announces shutdown on `signal` without reaching a
/// terminal state, then logs everything it is stepped with until told to
/// stop. Exercises the scheduler's handling of entities that linger in
/// the shutting-down state.
pub struct LingeringAnnouncer {
    pub log: Rc<RefCell<Vec<(Mailbox, bool)>>>,
    announced: bool,
    terminated: bool,
}

impl LingeringAnnouncer {
    pub fn new() -> (Entity, Rc<RefCell<Vec<(Mailbox, bool)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let announcer = Self {
            log: Rc::clone(&log),
            announced: false,
            terminated: false,
        };
        (entity(announcer), log)
    }
}

impl Component for LingeringAnnouncer {
    fn step(&mut self, inbox: Mailbox, message: Payload) -> Result<Step, TerminatedError> {
        if self.terminated {
            return Err(TerminatedError);
        }
        self.log.borrow_mut().push((inbox, message.is_shutdown()));
        if !self.announced {
            self.announced = true;
            return Ok(Step::Emit(Mailbox::Signal, payload(Shutdown)));
        }
        if message.is_shutdown() {
            self.terminated = true;
            return Ok(Step::Stop);
        }
        Ok(Step::Idle)
    }

    fn close(&mut self) {
        self.terminated = true;
    }

    fn lazy(&self) -> bool {
        false
    }
}
