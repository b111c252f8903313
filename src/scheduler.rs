//! Decompress/compress task scheduling (spec §5). Grounded on
//! `original_source/.../scheduling/DecompressScheduler.cpp`: a flat list
//! of per-code-block `BlockDescriptor`s is built up front (one per
//! code block across every precinct/resolution/component of a tile),
//! grouped by `ImageComponentFlow` into resolution-ordered batches, then
//! run either serially (single worker) or fanned out per batch.
//!
//! `rayon`'s scoped thread pool replaces the C++ original's
//! `tf::Executor`/`tf::Taskflow` (spec §9's redesign note: take an
//! explicit `Executor` handle, no process-wide singleton); batch
//! ordering still comes from `ImageComponentFlow`, so a wavelet step
//! never runs before every code block feeding it has decoded.

use crate::error::CoreError;
use crate::event::EventMgr;
use crate::flow::ImageComponentFlow;
use crate::precinct::BandOrientation;

/// Per-block gain exponent table from `DecompressScheduler.cpp`'s
/// `gain_b`, indexed by `BandOrientation`.
const GAIN_B: [u8; 4] = [0, 1, 1, 2];

/// One code block's decode/encode job, carrying everything
/// `DecompressScheduler::decompress` reads off its `BlockDescriptor`
/// (`x`,`y`,`tilec`,`bandIndex`,`bandNumbps`,`bandOrientation`, `cblk`,
/// `resno`, `roishift`, `stepsize`, derived `k_msbs`/`R_b`). The code
/// block payload itself (`cblk`) is left to the caller — this crate's
/// job is ordering the work, not owning T1 state (T1 is an external
/// collaborator per spec §1).
pub struct BlockJob<F> {
  pub compno: u32,
  pub resno: u32,
  pub orientation: BandOrientation,
  pub band_numbps: u8,
  pub roishift: i32,
  pub stepsize: f32,
  /// `band->numbps - cblk->numbps`, the block's insignificant MSB count.
  pub k_msbs: i32,
  pub run: F,
}

impl<F> BlockJob<F> {
  /// `R_b = precision + gain_b[orientation]`, the block's dynamic range
  /// (`DecompressScheduler.cpp`'s `blockDesc.R_b`).
  pub fn dynamic_range(&self, precision: u8) -> u8 {
    precision + GAIN_B[self.orientation_index()]
  }

  fn orientation_index(&self) -> usize {
    match self.orientation {
      BandOrientation::LL => 0,
      BandOrientation::HL => 1,
      BandOrientation::LH => 2,
      BandOrientation::HH => 3,
    }
  }
}

/// Wraps a `rayon` thread pool the way spec §9 asks: an explicit handle
/// passed in by the caller, never a process-wide singleton.
pub struct Executor {
  pool: Option<rayon::ThreadPool>,
}

impl Executor {
  /// `workers == 0` or `1` runs everything on the calling thread
  /// (`DecompressScheduler`'s single-worker serial path, which
  /// short-circuits on first failure instead of paying thread-pool
  /// overhead).
  pub fn new(workers: usize) -> Result<Self, CoreError> {
    if workers <= 1 {
      return Ok(Self { pool: None });
    }
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(workers)
      .build()
      .map_err(|e| CoreError::SchedulerInit {
        reason: e.to_string(),
      })?;
    Ok(Self { pool: Some(pool) })
  }

  pub fn is_parallel(&self) -> bool {
    self.pool.is_some()
  }

  /// Runs every block in `flow`'s resolution order, honoring each
  /// `ResFlow`'s precede-edge: a batch fully completes (and its wavelet
  /// step, if any, would run) before the next batch starts. Within a
  /// batch, jobs run concurrently when a pool is present. Mirrors
  /// `DecompressScheduler::decompress`'s `success` short-circuit flag:
  /// the first job to fail stops scheduling further batches.
  pub fn run_component<F>(&self, flow: &mut ImageComponentFlow<BlockJob<F>>, events: &EventMgr) -> bool
  where
    F: FnMut() -> bool + Send,
  {
    for res_flow in flow.res_flows.iter_mut() {
      let ok = match &self.pool {
        None => res_flow.blocks.iter_mut().all(|job| (job.run)()),
        Some(pool) => pool.install(|| {
          use rayon::prelude::*;
          res_flow.blocks.par_iter_mut().map(|job| (job.run)()).collect::<Vec<_>>().into_iter().all(|b| b)
        }),
      };
      if !ok {
        events.error("code-block decode failed, aborting component schedule");
        return false;
      }
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::LogSink;

  fn job(run: impl FnMut() -> bool + Send + 'static) -> BlockJob<Box<dyn FnMut() -> bool + Send>> {
    BlockJob {
      compno: 0,
      resno: 0,
      orientation: BandOrientation::LL,
      band_numbps: 8,
      roishift: 0,
      stepsize: 1.0,
      k_msbs: 0,
      run: Box::new(run),
    }
  }

  #[test]
  fn serial_executor_runs_every_block() {
    let exec = Executor::new(1).unwrap();
    let mut flow = ImageComponentFlow::new(2);
    let counter = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    for resno in 0..2 {
      let c = counter.clone();
      flow.push_block(
        resno,
        job(move || {
          c.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
          true
        }),
      );
    }
    let events = EventMgr::with_sink(Box::new(LogSink));
    assert!(exec.run_component(&mut flow, &events));
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 2);
  }

  #[test]
  fn first_failure_stops_subsequent_batches() {
    let exec = Executor::new(1).unwrap();
    let mut flow = ImageComponentFlow::new(3);
    let ran = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let r0 = ran.clone();
    flow.push_block(0, job(move || {
      r0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
      false
    }));
    let r1 = ran.clone();
    flow.push_block(2, job(move || {
      r1.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
      true
    }));
    let events = EventMgr::with_sink(Box::new(LogSink));
    assert!(!exec.run_component(&mut flow, &events));
    assert_eq!(ran.load(std::sync::atomic::Ordering::SeqCst), 1);
  }

  #[test]
  fn dynamic_range_adds_band_gain() {
    let j = job(|| true);
    assert_eq!(j.dynamic_range(8), 8);
    let mut j2 = job(|| true);
    j2.orientation = BandOrientation::HH;
    assert_eq!(j2.dynamic_range(8), 10);
  }
}
