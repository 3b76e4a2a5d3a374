//! Demo: building and running a pipeline end to end.
//!
//! A producer feeds a filter stage, the filter uppercases, and a sink
//! logs what arrives. The producer's exhaustion notice shuts the whole
//! chain down and drains the scheduler.
//!
//! Running This Demo:
//! ```bash
//! cargo run --example pipeline_demo
//! ```

use miette::Result;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wiregraph::adapters::{FilterFn, Producer, SinkFn};
use wiregraph::component::entity;
use wiregraph::containers::Pipeline;
use wiregraph::message::{Payload, Text, payload};
use wiregraph::post_office::PostOffice;
use wiregraph::scheduler::Scheduler;

fn init_tracing() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,wiregraph=debug"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    // Pretty panic reports
    miette::set_panic_hook();

    let source = entity(Producer::new(
        (1..=5).map(|n| payload(Text::new(format!("item {n}")))),
    ));

    let shout = entity(FilterFn::new(|message: Payload| {
        let text = message.downcast_ref::<Text>()?;
        Some(payload(Text::new(text.content.to_uppercase())))
    }));

    let sink = entity(SinkFn::new(|message: Payload| -> Option<Payload> {
        if let Some(text) = message.downcast_ref::<Text>() {
            info!(content = %text.content, "delivered");
        }
        None
    }));

    let pipeline = Pipeline::new([source, shout, sink])?;

    let mut scheduler = Scheduler::new(PostOffice::new());
    scheduler.register_container(&*pipeline.borrow())?;
    scheduler.run(None)?;

    info!(idle = scheduler.is_idle(), "pipeline drained");
    Ok(())
}
