//! Owned move-advisor session.
//!
//! A `SearchSession` runs at most one worker thread at a time. Requests are
//! numbered by an injectable id source; only responses carrying the latest
//! id are accepted, everything else is dropped. Cancelling sends `stop`,
//! raises the worker's stop flag and detaches the thread without waiting
//! for an acknowledgement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::chess_errors::AdvisorError;
use crate::engines::engine_trait::{Engine, EngineKind, GoParams};
use crate::game_state::game_state::GameState;
use crate::search::advisor_protocol::{AdvisorRequest, AdvisorResponse};
use crate::search::iterative_deepening::SearchMove;

/// Source of request identifiers. Must never repeat within a session.
pub trait RequestIdSource: Send {
    fn next_id(&mut self) -> u64;
}

/// Counts up from a starting value.
#[derive(Debug, Clone)]
pub struct MonotonicIds {
    next: u64,
}

impl MonotonicIds {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl Default for MonotonicIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl RequestIdSource for MonotonicIds {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Latest accepted advisor output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintUpdate {
    Progress { notation: String, depth: u8 },
    Complete(Option<String>),
    Failed,
}

struct Worker {
    requests: Sender<AdvisorRequest>,
    responses: Receiver<AdvisorResponse>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

pub struct SearchSession {
    engine_kind: EngineKind,
    default_depth: u8,
    ids: Box<dyn RequestIdSource>,
    latest_request: Option<u64>,
    in_flight: bool,
    worker: Option<Worker>,
    hint: Option<HintUpdate>,
}

impl SearchSession {
    pub fn new(engine_kind: EngineKind, default_depth: u8) -> Self {
        Self::with_ids(engine_kind, default_depth, Box::new(MonotonicIds::default()))
    }

    pub fn with_ids(engine_kind: EngineKind, default_depth: u8, ids: Box<dyn RequestIdSource>) -> Self {
        Self {
            engine_kind,
            default_depth,
            ids,
            latest_request: None,
            in_flight: false,
            worker: None,
            hint: None,
        }
    }

    #[inline]
    pub fn latest_request(&self) -> Option<u64> {
        self.latest_request
    }

    #[inline]
    pub fn hint(&self) -> Option<&HintUpdate> {
        self.hint.as_ref()
    }

    #[inline]
    pub fn is_searching(&self) -> bool {
        self.in_flight
    }

    /// Ask for a suggestion for `game_state`. A search still running is
    /// cancelled first. Returns the new request id.
    pub fn start(&mut self, game_state: &GameState, max_depth: Option<u8>) -> Result<u64, AdvisorError> {
        if self.in_flight {
            self.cancel();
        }

        let request_id = self.ids.next_id();
        let request = AdvisorRequest::Start {
            board: game_state.board.clone(),
            turn: game_state.turn,
            max_depth: max_depth.unwrap_or(self.default_depth),
            request_id,
            en_passant_target: game_state.en_passant_target,
        };

        let worker = match self.worker.take() {
            Some(worker) => worker,
            None => spawn_worker(self.engine_kind.build(self.default_depth))?,
        };
        worker
            .requests
            .send(request)
            .map_err(|_| AdvisorError::WorkerUnavailable)?;
        self.worker = Some(worker);

        self.latest_request = Some(request_id);
        self.in_flight = true;
        self.hint = None;
        info!(request_id, engine = ?self.engine_kind, "advisor search started");
        Ok(request_id)
    }

    /// Stop the running search and abandon its worker.
    pub fn cancel(&mut self) {
        let Some(mut worker) = self.worker.take() else {
            return;
        };
        if let Some(request_id) = self.latest_request {
            // The worker may already be gone; the stop flag covers that case.
            let _ = worker.requests.send(AdvisorRequest::Stop { request_id });
        }
        worker.stop.store(true, Ordering::Relaxed);
        drop(worker.handle.take());
        self.latest_request = None;
        self.in_flight = false;
        debug!("advisor worker detached");
    }

    /// Apply one response. Returns the accepted update, or `None` when the
    /// response belongs to an older request.
    pub fn handle_response(&mut self, response: AdvisorResponse) -> Option<HintUpdate> {
        if self.latest_request != Some(response.request_id()) {
            debug!(
                stale = response.request_id(),
                latest = ?self.latest_request,
                "discarding stale advisor response"
            );
            return None;
        }

        let update = match response {
            AdvisorResponse::Progress {
                move_notation,
                depth,
                ..
            } => HintUpdate::Progress {
                notation: move_notation,
                depth,
            },
            AdvisorResponse::Complete { move_notation, .. } => {
                self.in_flight = false;
                HintUpdate::Complete(move_notation)
            }
            AdvisorResponse::Failed { .. } => {
                self.in_flight = false;
                HintUpdate::Failed
            }
        };
        self.hint = Some(update.clone());
        Some(update)
    }

    /// Drain whatever the worker has sent so far.
    pub fn poll(&mut self) -> Vec<HintUpdate> {
        let mut received = Vec::new();
        let mut disconnected = false;
        if let Some(worker) = &self.worker {
            loop {
                match worker.responses.try_recv() {
                    Ok(response) => received.push(response),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }
        if disconnected {
            warn!("advisor worker exited unexpectedly");
            self.worker = None;
        }

        let mut updates: Vec<HintUpdate> = received
            .into_iter()
            .filter_map(|response| self.handle_response(response))
            .collect();
        if disconnected && self.in_flight {
            self.in_flight = false;
            self.hint = Some(HintUpdate::Failed);
            updates.push(HintUpdate::Failed);
        }
        updates
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn spawn_worker(engine: Box<dyn Engine>) -> Result<Worker, AdvisorError> {
    let (request_tx, request_rx) = channel::<AdvisorRequest>();
    let (response_tx, response_rx) = channel::<AdvisorResponse>();
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = Arc::clone(&stop);

    let handle = thread::Builder::new()
        .name("power-chess-advisor".to_owned())
        .spawn(move || run_worker(engine, request_rx, response_tx, worker_stop))
        .map_err(|_| AdvisorError::WorkerUnavailable)?;

    Ok(Worker {
        requests: request_tx,
        responses: response_rx,
        stop,
        handle: Some(handle),
    })
}

fn run_worker(
    mut engine: Box<dyn Engine>,
    requests: Receiver<AdvisorRequest>,
    responses: Sender<AdvisorResponse>,
    stop: Arc<AtomicBool>,
) {
    while let Ok(request) = requests.recv() {
        let AdvisorRequest::Start {
            board,
            turn,
            max_depth,
            request_id,
            en_passant_target,
        } = request
        else {
            stop.store(true, Ordering::Relaxed);
            continue;
        };
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let mut game_state = GameState::from_board(board, turn);
        game_state.en_passant_target = en_passant_target;
        let params = GoParams {
            depth: Some(max_depth),
            stop: Arc::clone(&stop),
        };

        let mut report = |depth: u8, mv: &SearchMove| {
            let _ = responses.send(AdvisorResponse::Progress {
                request_id,
                move_notation: mv.notation.clone(),
                depth,
            });
        };
        let response = match engine.choose_move(&game_state, &params, &mut report) {
            Ok(out) => AdvisorResponse::Complete {
                request_id,
                move_notation: out.best_move.map(|mv| mv.notation),
            },
            Err(err) => {
                warn!(request_id, %err, "advisor search failed");
                AdvisorResponse::Failed { request_id }
            }
        };
        if responses.send(response).is_err() {
            break;
        }
    }
    debug!(engine = engine.name(), "advisor worker finished");
}
