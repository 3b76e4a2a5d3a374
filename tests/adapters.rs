//! Behavior of the ready-made leaf components.

mod common;
use common::*;

use wiregraph::adapters::{FilterFn, NullSink, Passthrough, Producer, SinkFn};
use wiregraph::component::{Component, Step, TerminatedError};
use wiregraph::mailbox::Mailbox;
use wiregraph::message::{payload, Payload, ProducerFinished, Shutdown, Tick};

fn expect_emission(step: &Step, mailbox: Mailbox) -> &Payload {
    let (actual, message) = step.emission().expect("step should carry an emission");
    assert_eq!(*actual, mailbox);
    message
}

#[test]
fn passthrough_echoes_inbox_to_outbox() {
    let mut stage = Passthrough::new();
    let step = stage.step(Mailbox::Inbox, text("echo")).unwrap();
    assert_eq!(text_of(expect_emission(&step, Mailbox::Outbox)).unwrap(), "echo");

    // Non-shutdown control traffic is ignored.
    let step = stage.step(Mailbox::Control, text("chatter")).unwrap();
    assert!(step.emission().is_none());
}

#[test]
fn filter_maps_suppresses_and_shuts_down() {
    let mut shout = FilterFn::new(|message: Payload| {
        let content = text_of(&message)?;
        if content == "drop me" {
            return None;
        }
        Some(text(&content.to_uppercase()))
    });

    let step = shout.step(Mailbox::Inbox, text("hello")).unwrap();
    assert_eq!(
        text_of(expect_emission(&step, Mailbox::Outbox)).unwrap(),
        "HELLO"
    );

    let step = shout.step(Mailbox::Inbox, text("drop me")).unwrap();
    assert!(step.emission().is_none());
    assert!(!step.is_terminal());

    // A filter whose callable answers with a shutdown message ends the
    // stage through `signal`.
    let mut quitter = FilterFn::new(|_message: Payload| Some(payload(Shutdown)));
    let step = quitter.step(Mailbox::Inbox, text("anything")).unwrap();
    assert!(step.is_terminal());
    assert!(expect_emission(&step, Mailbox::Signal).is_shutdown());
    assert!(matches!(
        quitter.step(Mailbox::Inbox, text("late")),
        Err(TerminatedError)
    ));
}

#[test]
fn producer_yields_then_announces_exhaustion() {
    let items: Vec<Payload> = vec![text("a"), text("b")];
    let mut producer = Producer::new(items.into_iter());
    assert!(!producer.lazy());

    for expected in ["a", "b"] {
        let step = producer.step(Mailbox::Control, payload(Tick)).unwrap();
        assert_eq!(
            text_of(expect_emission(&step, Mailbox::Outbox)).unwrap(),
            expected
        );
        assert!(!step.is_terminal());
    }

    let step = producer.step(Mailbox::Control, payload(Tick)).unwrap();
    assert!(step.is_terminal());
    let message = expect_emission(&step, Mailbox::Signal);
    assert!(message.is_shutdown());
    assert!(message.downcast_ref::<ProducerFinished>().is_some());

    assert!(matches!(
        producer.step(Mailbox::Control, payload(Tick)),
        Err(TerminatedError)
    ));
}

#[test]
fn sink_consumes_quietly_until_it_decides_to_stop() {
    let mut counter = 0;
    let mut sink = SinkFn::new(move |_message: Payload| -> Option<Payload> {
        counter += 1;
        if counter == 2 {
            Some(payload(Shutdown))
        } else {
            None
        }
    });

    let step = sink.step(Mailbox::Inbox, text("one")).unwrap();
    assert!(step.emission().is_none());
    assert!(!step.is_terminal());

    let step = sink.step(Mailbox::Inbox, text("two")).unwrap();
    assert!(step.is_terminal());
    assert!(expect_emission(&step, Mailbox::Signal).is_shutdown());
}

#[test]
fn null_sink_swallows_everything_but_shutdown() {
    let mut sink = NullSink::new();
    let step = sink.step(Mailbox::Inbox, text("gone")).unwrap();
    assert!(step.emission().is_none());

    let step = sink.step(Mailbox::Control, payload(Shutdown)).unwrap();
    assert!(step.is_terminal());
    assert!(expect_emission(&step, Mailbox::Signal).is_shutdown());
}

#[test]
fn every_adapter_relays_shutdown_on_signal() {
    let shutdown = payload(Shutdown);

    let mut passthrough = Passthrough::new();
    let step = passthrough
        .step(Mailbox::Control, shutdown.clone())
        .unwrap();
    assert!(step.is_terminal());
    assert!(expect_emission(&step, Mailbox::Signal).is_shutdown());

    let mut filter = FilterFn::new(|message: Payload| Some(message));
    let step = filter.step(Mailbox::Control, shutdown.clone()).unwrap();
    assert!(step.is_terminal());

    let mut producer = Producer::new(std::iter::empty());
    let step = producer.step(Mailbox::Control, shutdown.clone()).unwrap();
    assert!(step.is_terminal());
    assert!(expect_emission(&step, Mailbox::Signal).is_shutdown());

    let mut sink = SinkFn::new(|_message: Payload| -> Option<Payload> { None });
    let step = sink.step(Mailbox::Control, shutdown).unwrap();
    assert!(step.is_terminal());
}
