use crate::config::FillRule;
use crate::resolve::resolve_tile_scalar;
use crate::simd::resolve_tile_simd;
use raster_geom::{Argb, RasterError};

/// One tile's resolve work, carrying ownership of every buffer the job
/// needs. Nothing here is borrowed: the job is handed to a worker and the
/// buffers come back (renamed into a [`ResolveResult`]) once it finishes,
/// so at no point does the orchestrator and a worker thread see the same
/// buffer at the same time.
pub struct ResolveJob {
  pub tile_index: usize,
  pub width: u32,
  pub height: u32,
  pub covers: Vec<i32>,
  pub areas: Vec<i32>,
  pub active_mask: Vec<u32>,
  pub framebuffer: Vec<u32>,
  pub color: Argb,
  pub fill_rule: FillRule,
  pub use_simd: bool,
}

pub struct ResolveResult {
  pub tile_index: usize,
  pub covers: Vec<i32>,
  pub areas: Vec<i32>,
  pub active_mask: Vec<u32>,
  pub framebuffer: Vec<u32>,
}

fn run_job(job: ResolveJob) -> Result<ResolveResult, RasterError> {
  let ResolveJob {
    tile_index,
    width,
    height,
    mut covers,
    mut areas,
    mut active_mask,
    mut framebuffer,
    color,
    fill_rule,
    use_simd,
  } = job;

  let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    if use_simd {
      resolve_tile_simd(width, height, &mut covers, &mut areas, &mut active_mask, &mut framebuffer, color, fill_rule);
    } else {
      resolve_tile_scalar(width, height, &mut covers, &mut areas, &mut active_mask, &mut framebuffer, color, fill_rule);
    }
  }));

  match outcome {
    Ok(()) => Ok(ResolveResult {
      tile_index,
      covers,
      areas,
      active_mask,
      framebuffer,
    }),
    Err(payload) => Err(RasterError::WorkerFailure {
      tile_index,
      reason: panic_message(payload),
    }),
  }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "worker panicked with a non-string payload".to_string()
  }
}

/// A persistent set of long-lived worker threads that resolve dirty tiles
/// in parallel. Jobs are dispatched by moving each tile's buffers into the
/// rayon thread pool and collecting replies on a crossbeam channel; the
/// pool's own threads are reused across every flush for the rasterizer's
/// lifetime, torn down only when the rasterizer is disposed.
#[derive(Debug)]
pub struct WorkerPool {
  pool: rayon::ThreadPool,
}

impl WorkerPool {
  /// Builds a pool with the given number of worker threads. Returns `None`
  /// on failure rather than an error — pool creation is one of the
  /// silently-recovered conditions; callers fall back to serial resolve.
  pub fn new(worker_count: usize) -> Option<Self> {
    rayon::ThreadPoolBuilder::new()
      .num_threads(worker_count.max(1))
      .thread_name(|i| format!("raster-resolve-{i}"))
      .build()
      .ok()
      .map(|pool| WorkerPool { pool })
  }

  /// Dispatches every job across the pool and blocks until all of them
  /// have replied, preserving no particular completion order but returning
  /// one result per submitted job.
  pub fn resolve_all(&self, jobs: Vec<ResolveJob>) -> Vec<Result<ResolveResult, RasterError>> {
    let job_count = jobs.len();
    let (result_tx, result_rx) = crossbeam_channel::unbounded();

    for job in jobs {
      let tx = result_tx.clone();
      self.pool.spawn(move || {
        let _ = tx.send(run_job(job));
      });
    }
    drop(result_tx);

    let mut results = Vec::with_capacity(job_count);
    for _ in 0..job_count {
      match result_rx.recv() {
        Ok(result) => results.push(result),
        Err(_) => break,
      }
    }
    results
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_job(tile_index: usize, use_simd: bool) -> ResolveJob {
    ResolveJob {
      tile_index,
      width: 4,
      height: 1,
      covers: vec![256, 0, 0, 0],
      areas: vec![0, 0, 0, 0],
      active_mask: vec![1],
      framebuffer: vec![Argb::WHITE.0; 4],
      color: Argb::from_channels(0xFF, 255, 0, 0),
      fill_rule: FillRule::NonZero,
      use_simd,
    }
  }

  #[test]
  fn pool_resolves_every_submitted_job_exactly_once() {
    let pool = WorkerPool::new(2).expect("pool should build in a test environment");
    let jobs = vec![sample_job(0, false), sample_job(1, true), sample_job(2, false)];
    let results = pool.resolve_all(jobs);
    assert_eq!(results.len(), 3);
    let mut seen: Vec<usize> = results.iter().filter_map(|r| r.as_ref().ok()).map(|r| r.tile_index).collect();
    seen.sort();
    assert_eq!(seen, vec![0, 1, 2]);
  }

  #[test]
  fn buffers_round_trip_through_a_job() {
    let pool = WorkerPool::new(1).expect("pool should build in a test environment");
    let results = pool.resolve_all(vec![sample_job(5, false)]);
    let result = results[0].as_ref().expect("job should not fail");
    assert_eq!(result.tile_index, 5);
    assert_eq!(result.covers, vec![0, 0, 0, 0]);
    assert_eq!(result.active_mask, vec![0]);
  }
}
