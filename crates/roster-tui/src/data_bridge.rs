//! Data bridge: connects [`Roster`] state to TUI actions.
//!
//! Runs as a background task: kicks off the initial load, then forwards
//! every collection, session, in-flight, load-state and pending-delete
//! change as an [`Action`] through the TUI's action channel.

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use roster_core::{RemoteCollection, Roster};

use crate::action::Action;

/// Spawn the bridge between [`Roster`] observables and the action loop.
///
/// Sends the current snapshots first so the screen never renders stale
/// defaults, starts the initial load on its own task, then streams
/// changes until cancelled.
pub async fn spawn_data_bridge<R: RemoteCollection>(
    roster: Roster<R>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut students = roster.students();
    let mut session = roster.session_changes();
    let mut in_flight = roster.in_flight();
    let mut load_state = roster.load_state();
    let mut pending_delete = roster.pending_delete();
    let mut events = roster.events();

    let _ = action_tx.send(Action::StudentsUpdated(students.current().clone()));
    let _ = action_tx.send(Action::SessionChanged(session.borrow_and_update().clone()));
    let _ = action_tx.send(Action::InFlightChanged(*in_flight.borrow_and_update()));
    let _ = action_tx.send(Action::LoadStateChanged(
        load_state.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::PendingDeleteChanged(
        pending_delete.borrow_and_update().clone(),
    ));

    // Failures surface through the event stream and load state.
    let loader = roster.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.load().await {
            debug!(error = %e, "initial load did not complete");
        }
    });

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = students.changed() => {
                debug!(count = snapshot.len(), "dispatching StudentsUpdated");
                let _ = action_tx.send(Action::StudentsUpdated(snapshot));
            }
            Ok(()) = session.changed() => {
                let snapshot = session.borrow_and_update().clone();
                let _ = action_tx.send(Action::SessionChanged(snapshot));
            }
            Ok(()) = in_flight.changed() => {
                let op = *in_flight.borrow_and_update();
                let _ = action_tx.send(Action::InFlightChanged(op));
            }
            Ok(()) = load_state.changed() => {
                let state = load_state.borrow_and_update().clone();
                let _ = action_tx.send(Action::LoadStateChanged(state));
            }
            Ok(()) = pending_delete.changed() => {
                let pending = pending_delete.borrow_and_update().clone();
                let _ = action_tx.send(Action::PendingDeleteChanged(pending));
            }
            result = events.recv() => match result {
                Ok(event) => {
                    let _ = action_tx.send(Action::Roster(event));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    debug!("data bridge stopped");
}
