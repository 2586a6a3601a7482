//! `reconciler-host`: runs serialized topology resources through the guest
//! `reconcile` export.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Resolve configuration**: read `reconciler.toml` (or `--config`) and
//!    apply command-line overrides ([`config`]).
//! 2. **Wire observability**: install `tracing-subscriber` with a JSON or
//!    pretty layer on stderr, and an OpenTelemetry OTLP exporter when an
//!    endpoint is configured ([`telemetry`]).
//! 3. **Bind the export**: register the configured topology reconciler with
//!    the guest registry, exactly once, before any call.
//! 4. **Reconcile**: read each file (or stdin), dispatch every payload to a
//!    blocking task, and print one JSON envelope per input to stdout in input
//!    order ([`host`]).
//!
//! The process exits non-zero when any input produced an error envelope.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

mod config;
mod host;
mod telemetry;

use config::{Args, HostConfig};
use host::Tally;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = HostConfig::resolve(&args)?;
    let telemetry = telemetry::init(&config)?;

    let result = run(&args, config).await;

    telemetry.shutdown();
    result
}

async fn run(args: &Args, config: HostConfig) -> anyhow::Result<ExitCode> {
    info!(
        requeue_after_secs = config.topology.requeue_after_secs,
        admin_state = ?config.topology.admin_state,
        "binding topology reconciler"
    );
    let reconciler = guest::configured_reconciler(config.topology);
    guest::register(guest::Export::new(Arc::new(reconciler)))
        .context("cannot bind the reconcile export")?;

    let inputs = host::read_inputs(&args.files).await?;
    let envelopes = host::reconcile_all(inputs).await?;

    let mut stdout = std::io::stdout().lock();
    for envelope in &envelopes {
        writeln!(stdout, "{}", envelope.to_json()?)?;
    }
    stdout.flush()?;

    let tally = Tally::of(&envelopes);
    info!(
        ok = tally.ok,
        input_errors = tally.input_errors,
        internal_errors = tally.internal_errors,
        "reconciliation finished"
    );

    Ok(if tally.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
