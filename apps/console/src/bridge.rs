//! Bridge between the stdin reader and the backend worker that owns the page.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use page_controller::{dispatch_batch, ActionOutcome, EmployeePage, PageCommand};

use crate::render;

pub const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Queues one parsed console line. Returns a status message when it could not be queued.
pub fn queue_commands(cmd_tx: &Sender<Vec<PageCommand>>, batch: Vec<PageCommand>) -> Option<String> {
    let names: Vec<&str> = batch.iter().map(PageCommand::name).collect();
    match cmd_tx.try_send(batch) {
        Ok(()) => {
            tracing::debug!(commands = ?names, "queued console->backend commands");
            None
        }
        Err(TrySendError::Full(_)) => Some("command queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => {
            Some("backend worker stopped (possible startup/runtime failure)".to_string())
        }
    }
}

/// Runs one console line against the page and prints feedback for outcomes
/// that publish no event.
pub async fn run_batch(page: &EmployeePage, batch: Vec<PageCommand>) -> Vec<ActionOutcome> {
    let outcomes = dispatch_batch(page, batch).await;
    for line in outcomes.iter().filter_map(render::outcome_line) {
        println!("{line}");
    }
    outcomes
}

/// Runs the page on a dedicated runtime until the command channel closes.
pub fn start_backend(
    page: Arc<EmployeePage>,
    cmd_rx: Receiver<Vec<PageCommand>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                eprintln!("backend worker startup failure: failed to build runtime: {err}");
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut events = page.subscribe_events();
            page.init().await;
            render::drain(&mut events);

            while let Ok(batch) = cmd_rx.recv() {
                run_batch(&page, batch).await;
                render::drain(&mut events);
            }
            tracing::debug!("command channel closed; backend worker exiting");
        });
    })
}
