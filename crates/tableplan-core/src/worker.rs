//! Background placement worker.
//!
//! A placement search runs to completion on a dedicated thread so it never
//! blocks an interactive surface. The engine moves into the worker and is
//! exclusively owned by it for the duration of the run — no locks, because
//! no other task can touch the grid or layout until the handle is joined.
//! Progress events arrive over a channel and are advisory only. There is
//! no cancellation: a running search always completes or exhausts its
//! retry budgets.

use crate::engine::{EngineError, PlacementEngine, PlacementEvent, PlacementOutcome, PlacementRequest};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Handle to a placement search running in the background.
pub struct PlacementHandle {
    /// Progress events, closed after [`PlacementEvent::Finished`].
    pub events: Receiver<PlacementEvent>,
    handle: JoinHandle<(PlacementEngine, Result<PlacementOutcome, EngineError>)>,
}

impl PlacementHandle {
    /// Block until the run completes, returning the engine and outcome.
    pub fn join(self) -> (PlacementEngine, Result<PlacementOutcome, EngineError>) {
        self.handle.join().expect("placement worker panicked")
    }

    /// Whether the search is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Run a placement search on a background thread. The engine comes back
/// from [`PlacementHandle::join`] once the search ends.
pub fn spawn_placement(mut engine: PlacementEngine, request: PlacementRequest) -> PlacementHandle {
    let (tx, events) = mpsc::channel();
    let handle = thread::spawn(move || {
        engine.set_event_sink(Some(tx));
        let outcome = engine.run(&request);
        // Dropping the sender closes the event stream for the consumer.
        engine.set_event_sink(None);
        (engine, outcome)
    });
    PlacementHandle { events, handle }
}
