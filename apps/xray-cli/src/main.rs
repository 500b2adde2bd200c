mod args;
mod input;
mod report;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::Receiver;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use xray_client::{
    ClientCommand, ProtocolSession, SessionConfig, SessionDriver, SessionEvent, Turn, WsTransport,
};
use xray_core::{RegionDescriptor, RegionIndex, trs80};

use crate::{
    args::Args,
    input::{Input, Submit},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    args.apply_to(&mut config);
    let regions = load_regions(&args)?;
    info!("Debugger link to {} ({} regions)", config.url, regions.len());

    let (transport, transport_events) = WsTransport::new(config.url.clone());
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (command_tx, command_rx) = mpsc::channel(32);
    let session = ProtocolSession::new(transport, config, regions, event_tx);
    let mut driver = SessionDriver::new(session, transport_events, command_rx);

    println!("{}", input::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut shutdown_pending = false;

    loop {
        // Retried each pass until the driver has room for it.
        if shutdown_pending {
            match input::submit(&command_tx, ClientCommand::Shutdown) {
                Submit::Sent => shutdown_pending = false,
                Submit::Busy => {}
                Submit::Closed => break,
            }
        }

        tokio::select! {
            turn = driver.turn() => {
                print_events(&driver, &event_rx);
                if turn == Turn::Stopped {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match input::parse(&line) {
                    Ok(Input::Client(command)) => match input::submit(&command_tx, command) {
                        Submit::Sent => {}
                        Submit::Busy => println!("busy, command dropped"),
                        Submit::Closed => break,
                    },
                    Ok(Input::Show) => println!("{}", report::mirror(driver.session().mirror())),
                    Ok(Input::Help) => println!("{}", input::HELP),
                    Ok(Input::Empty) => {}
                    Err(e) => println!("{e}"),
                },
                None => {
                    stdin_open = false;
                    shutdown_pending = true;
                }
            },
        }
    }

    info!("Session closed");
    Ok(())
}

fn print_events(driver: &SessionDriver<WsTransport>, events: &Receiver<SessionEvent>) {
    let session = driver.session();
    for event in events.try_iter() {
        let line = match event {
            SessionEvent::StatusChanged(state) => Some(report::status(state, session.last_error())),
            other => report::event(&other, session.mirror(), session.memory_mode()),
        };
        if let Some(line) = line {
            println!("{line}");
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<SessionConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_regions(args: &Args) -> anyhow::Result<RegionIndex> {
    let descriptors = match &args.regions {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading regions {}", path.display()))?;
            serde_json::from_str::<Vec<RegionDescriptor>>(&text)
                .with_context(|| format!("parsing regions {}", path.display()))?
        }
        None => trs80::memory_regions(),
    };
    Ok(match args.model {
        Some(model) => RegionIndex::build_for_model(descriptors, model),
        None => RegionIndex::build(descriptors),
    })
}
