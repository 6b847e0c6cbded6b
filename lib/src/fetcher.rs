//! # Background card fetching
//!
//! Card lookups may hit the network, so they run on worker threads, one per
//! [`Lane`]. Every finished job comes back over a single results channel that
//! the interaction thread drains, which keeps all state changes on that one
//! thread.
//!
//! In a superseding lane only the most recently submitted job matters. Older
//! jobs still queued when a newer one arrives are skipped, and results that
//! were already in flight are discarded when they are drained.
use crate::provider::{CardProvider, CardSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lane groups jobs that share a worker thread
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Lane {
  /// Card preview for the search text
  Preview,
  /// Deck edits, imports and resets, applied in submission order
  Edit,
  /// Mana curve computation
  Curve,
}

impl Lane {
  pub const ALL: [Lane; 3] = [Lane::Preview, Lane::Edit, Lane::Curve];

  /// Returns true if a newer job makes older ones in this lane obsolete
  pub fn supersedes(self) -> bool {
    self != Lane::Edit
  }

  fn index(self) -> usize {
    self as usize
  }
}

/// Completed is a job result that is still current
#[derive(Debug)]
pub struct Completed<T> {
  pub lane: Lane,
  pub generation: u64,
  pub value: T,
}

type Job<S, T> = Box<dyn FnOnce(&CardProvider<S>) -> T + Send + 'static>;

struct Request<S, T> {
  generation: u64,
  job: Job<S, T>,
}

/// Sent back for every request; `value` is `None` for a skipped job
struct Outcome<T> {
  lane: Lane,
  generation: u64,
  value: Option<T>,
}

struct Worker<S, T> {
  lane: Lane,
  sender: Option<Sender<Request<S, T>>>,
  latest: Arc<AtomicU64>,
  handle: Option<JoinHandle<()>>,
}

impl<S, T> Worker<S, T>
where
  S: CardSource + Send + Sync + 'static,
  T: Send + 'static,
{
  fn spawn(lane: Lane, provider: Arc<CardProvider<S>>, results: Sender<Outcome<T>>) -> Self {
    let (sender, requests) = channel::<Request<S, T>>();
    let latest = Arc::new(AtomicU64::new(0));
    let worker_latest = Arc::clone(&latest);
    let handle = thread::spawn(move || {
      for request in requests {
        let stale = lane.supersedes() && request.generation < worker_latest.load(Ordering::SeqCst);
        let value = if stale {
          debug!("Skipping superseded {:?} job {}", lane, request.generation);
          None
        } else {
          Some((request.job)(&provider))
        };
        let outcome = Outcome {
          lane,
          generation: request.generation,
          value,
        };
        if results.send(outcome).is_err() {
          break;
        }
      }
    });
    Self {
      lane,
      sender: Some(sender),
      latest,
      handle: Some(handle),
    }
  }
}

/// Fetcher runs jobs against a shared `CardProvider` off the calling thread
pub struct Fetcher<S, T> {
  provider: Arc<CardProvider<S>>,
  workers: Vec<Worker<S, T>>,
  results: Receiver<Outcome<T>>,
  next_generation: u64,
  pending: [usize; 3],
}

impl<S, T> Fetcher<S, T>
where
  S: CardSource + Send + Sync + 'static,
  T: Send + 'static,
{
  pub fn new(provider: CardProvider<S>) -> Self {
    let provider = Arc::new(provider);
    let (sender, results) = channel();
    let workers = Lane::ALL
      .iter()
      .map(|&lane| Worker::spawn(lane, Arc::clone(&provider), sender.clone()))
      .collect();
    Self {
      provider,
      workers,
      results,
      next_generation: 0,
      pending: [0; 3],
    }
  }

  /// Queues `job` in `lane` and returns its generation.
  /// Generations increase with every submission.
  pub fn submit<F>(&mut self, lane: Lane, job: F) -> u64
  where
    F: FnOnce(&CardProvider<S>) -> T + Send + 'static,
  {
    self.next_generation += 1;
    let generation = self.next_generation;
    let worker = &self.workers[lane.index()];
    worker.latest.store(generation, Ordering::SeqCst);
    let request = Request {
      generation,
      job: Box::new(job),
    };
    match worker.sender.as_ref().map(|s| s.send(request)) {
      Some(Ok(())) => self.pending[lane.index()] += 1,
      _ => error!("{:?} worker is gone, dropping job {}", lane, generation),
    }
    generation
  }

  /// Returns every current result that has arrived, without blocking
  pub fn drain(&mut self) -> Vec<Completed<T>> {
    let mut completed = Vec::new();
    while let Ok(outcome) = self.results.try_recv() {
      if let Some(c) = self.accept(outcome) {
        completed.push(c);
      }
    }
    completed
  }

  /// Blocks until the next current result arrives.
  /// Returns `None` once no job is outstanding.
  pub fn recv(&mut self) -> Option<Completed<T>> {
    while self.pending() > 0 {
      let outcome = self.results.recv().ok()?;
      if let Some(c) = self.accept(outcome) {
        return Some(c);
      }
    }
    None
  }

  /// Returns true if `generation` is the newest job submitted to `lane`
  pub fn is_current(&self, lane: Lane, generation: u64) -> bool {
    !lane.supersedes() || self.workers[lane.index()].latest.load(Ordering::SeqCst) == generation
  }

  pub fn provider(&self) -> &CardProvider<S> {
    &self.provider
  }

  /// Returns the number of submitted jobs that have not come back yet
  pub fn pending(&self) -> usize {
    self.pending.iter().sum()
  }

  /// Returns the number of jobs submitted to `lane` that have not come back yet
  pub fn pending_in(&self, lane: Lane) -> usize {
    self.pending[lane.index()]
  }

  fn accept(&mut self, outcome: Outcome<T>) -> Option<Completed<T>> {
    let pending = &mut self.pending[outcome.lane.index()];
    *pending = pending.saturating_sub(1);
    let value = outcome.value?;
    if !self.is_current(outcome.lane, outcome.generation) {
      debug!(
        "Discarding superseded {:?} result {}",
        outcome.lane, outcome.generation
      );
      return None;
    }
    Some(Completed {
      lane: outcome.lane,
      generation: outcome.generation,
      value,
    })
  }
}

impl<S, T> Drop for Fetcher<S, T> {
  fn drop(&mut self) {
    for worker in &mut self.workers {
      worker.sender.take();
    }
    for worker in &mut self.workers {
      if let Some(handle) = worker.handle.take() {
        if handle.join().is_err() {
          error!("{:?} worker panicked", worker.lane);
        }
      }
    }
  }
}
