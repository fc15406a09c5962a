//! Background chunk meshing on a fixed pool of worker threads.
//!
//! The control thread submits [`MeshRequest`]s and collects [`MeshResult`]s
//! each tick via [`MeshingPool::drain_results`]. Meshing never blocks the
//! control thread. At most one request per chunk is in flight; superseded
//! work is not cancelled and its meshes are cached on arrival. A request
//! whose build panics still produces a result, carrying a [`MeshFailure`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use strata_mesh::{MeshBuilder, MeshPayload};
use strata_terrain::HeightField;

use crate::chunk::ChunkCoord;

/// A request to mesh one chunk at one or more LODs.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshRequest {
    pub coord: ChunkCoord,
    /// Interior height-field origin of the chunk.
    pub offset: (usize, usize),
    /// LOD the chunk is waiting to display.
    pub lod: u8,
    /// Every LOD to build, `lod` included.
    pub lods: Vec<u8>,
}

/// A request whose build panicked on the worker.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("meshing panicked: {0}")]
pub struct MeshFailure(pub String);

/// Finished meshes for one request.
#[derive(Debug)]
pub struct MeshResult {
    pub coord: ChunkCoord,
    pub lod: u8,
    /// One payload per requested LOD, in request order.
    pub meshes: Result<Vec<Arc<MeshPayload>>, MeshFailure>,
    /// Build time in microseconds.
    pub elapsed_us: u64,
}

/// What [`MeshingPool::submit`] did with a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Queued,
    /// The chunk already has a request in flight at the given LOD.
    Duplicate(u8),
    /// The in-flight budget is exhausted or the pool is shut down.
    Busy,
}

/// Worker count leaving headroom for the control and render threads.
pub fn default_worker_count() -> usize {
    let cpus = num_cpus::get().max(2);
    (cpus - 2).max(1)
}

/// Fixed pool of meshing threads sharing one height field and builder.
pub struct MeshingPool {
    task_sender: Option<Sender<MeshRequest>>,
    result_receiver: Receiver<MeshResult>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Chunks with a request queued or running, and the LOD requested.
    active: Arc<DashMap<ChunkCoord, u8>>,
    in_flight: Arc<AtomicUsize>,
    budget: usize,
}

impl MeshingPool {
    /// Spawn `worker_count` threads (at least one) with an in-flight `budget`.
    pub fn new(
        worker_count: usize,
        budget: usize,
        field: Arc<HeightField>,
        builder: Arc<MeshBuilder>,
    ) -> Self {
        let worker_count = worker_count.max(1);
        let budget = budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<MeshRequest>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let field = Arc::clone(&field);
            let builder = Arc::clone(&builder);
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("mesh-worker-{i}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let start = Instant::now();
                        let (ox, oy) = request.offset;
                        let meshes = panic::catch_unwind(AssertUnwindSafe(|| {
                            request
                                .lods
                                .iter()
                                .map(|&lod| Arc::new(builder.build(&field, ox, oy, lod)))
                                .collect::<Vec<_>>()
                        }))
                        .map_err(|payload| MeshFailure(panic_message(payload.as_ref())));
                        let elapsed_us = start.elapsed().as_micros() as u64;

                        flight.fetch_sub(1, Ordering::Relaxed);
                        let sent = tx.send(MeshResult {
                            coord: request.coord,
                            lod: request.lod,
                            meshes,
                            elapsed_us,
                        });
                        if sent.is_err() {
                            tracing::warn!(coord = %request.coord, "mesh result dropped, pool receiver gone");
                        }
                    }
                })
                .expect("Failed to spawn mesh worker thread");
            handles.push(handle);
        }

        tracing::info!(workers = worker_count, budget, "meshing pool started");

        Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            active: Arc::new(DashMap::new()),
            in_flight,
            budget,
        }
    }

    /// Queue a request unless the chunk already has one in flight.
    pub fn submit(&self, request: MeshRequest) -> SubmitOutcome {
        let Some(sender) = &self.task_sender else {
            return SubmitOutcome::Busy;
        };
        if self.in_flight.load(Ordering::Relaxed) >= self.budget {
            return SubmitOutcome::Busy;
        }
        match self.active.entry(request.coord) {
            Entry::Occupied(existing) => SubmitOutcome::Duplicate(*existing.get()),
            Entry::Vacant(slot) => {
                let coord = request.coord;
                slot.insert(request.lod);
                self.in_flight.fetch_add(1, Ordering::Relaxed);
                if sender.try_send(request).is_err() {
                    self.in_flight.fetch_sub(1, Ordering::Relaxed);
                    self.active.remove(&coord);
                    return SubmitOutcome::Busy;
                }
                SubmitOutcome::Queued
            }
        }
    }

    /// Drain all completed results. Call once per tick on the control thread.
    pub fn drain_results(&self) -> Vec<MeshResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_receiver.try_recv() {
            self.active.remove(&result.coord);
            results.push(result);
        }
        results
    }

    /// Requests queued or being built.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// LOD of the chunk's pending request.
    pub fn pending_lod(&self, coord: &ChunkCoord) -> Option<u8> {
        self.active.get(coord).map(|lod| *lod)
    }

    /// Number of live worker threads; zero after [`shutdown`](Self::shutdown).
    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Close the task channel and join every worker.
    ///
    /// Queued requests are still built before the workers exit.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl Drop for MeshingPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use strata_terrain::{HeightCurve, NoiseField, NoiseLayer, RegionTable};

    const CHUNK: usize = 24;

    fn pool(workers: usize, budget: usize) -> MeshingPool {
        let noise = NoiseField::new(vec![NoiseLayer::default()]);
        let field = HeightField::build(1, &noise, &RegionTable::default(), 2 * CHUNK + 1, 2 * CHUNK + 1);
        let builder = MeshBuilder::new(CHUNK, 10.0, HeightCurve::identity());
        MeshingPool::new(workers, budget, Arc::new(field), Arc::new(builder))
    }

    fn request(x: u32, y: u32, lods: Vec<u8>) -> MeshRequest {
        MeshRequest {
            coord: ChunkCoord::new(x, y),
            offset: (x as usize * CHUNK, y as usize * CHUNK),
            lod: lods[0],
            lods,
        }
    }

    fn collect(pool: &MeshingPool, expected: usize) -> Vec<MeshResult> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while results.len() < expected && Instant::now() < deadline {
            results.extend(pool.drain_results());
            std::thread::sleep(Duration::from_millis(2));
        }
        results
    }

    #[test]
    fn test_results_arrive_via_channel() {
        let pool = pool(2, 16);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(pool.submit(request(x, y, vec![2])), SubmitOutcome::Queued);
        }
        let results = collect(&pool, 4);
        assert_eq!(results.len(), 4);
        for result in &results {
            let meshes = result.meshes.as_ref().unwrap();
            assert!(meshes.len() == 1 && meshes[0].lod == 2);
        }
        assert_eq!(pool.in_flight_count(), 0);
        assert_eq!(pool.pending_lod(&ChunkCoord::new(0, 0)), None);
    }

    #[test]
    fn test_multiple_lods_built_per_request() {
        let pool = pool(1, 4);
        pool.submit(request(0, 0, vec![0, 1]));
        let results = collect(&pool, 1);
        let meshes = results[0].meshes.as_ref().unwrap();
        let lods: Vec<u8> = meshes.iter().map(|m| m.lod).collect();
        assert_eq!(lods, vec![0, 1]);
        assert_eq!(results[0].lod, 0);
    }

    #[test]
    fn test_duplicate_request_refused() {
        let pool = pool(1, 16);
        assert_eq!(pool.submit(request(1, 1, vec![0])), SubmitOutcome::Queued);
        assert_eq!(pool.pending_lod(&ChunkCoord::new(1, 1)), Some(0));
        assert_eq!(
            pool.submit(request(1, 1, vec![2])),
            SubmitOutcome::Duplicate(0)
        );
        let results = collect(&pool, 1);
        assert_eq!(results.len(), 1);
        std::thread::sleep(Duration::from_millis(20));
        assert!(pool.drain_results().is_empty());
        assert_eq!(pool.submit(request(1, 1, vec![2])), SubmitOutcome::Queued);
    }

    #[test]
    fn test_budget_limits_active_tasks() {
        let pool = pool(1, 2);
        let mut submitted = 0;
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            if pool.submit(request(x, y, vec![0])) == SubmitOutcome::Queued {
                submitted += 1;
            }
            assert!(pool.in_flight_count() <= 2);
        }
        assert!(submitted >= 2, "got {submitted}");
    }

    #[test]
    fn test_panicking_build_releases_chunk() {
        let pool = pool(1, 4);
        let broken = MeshRequest {
            coord: ChunkCoord::new(5, 5),
            offset: (5 * CHUNK, 5 * CHUNK),
            lod: 0,
            lods: vec![0],
        };
        assert_eq!(pool.submit(broken), SubmitOutcome::Queued);

        let results = collect(&pool, 1);
        assert_eq!(results.len(), 1);
        assert!(results[0].meshes.is_err());
        assert_eq!(pool.in_flight_count(), 0);
        assert_eq!(pool.pending_lod(&ChunkCoord::new(5, 5)), None);

        // The worker survives and keeps building.
        assert_eq!(pool.submit(request(0, 0, vec![1])), SubmitOutcome::Queued);
        let results = collect(&pool, 1);
        assert_eq!(results[0].meshes.as_ref().unwrap()[0].lod, 1);
    }

    #[test]
    fn test_shutdown_rejects_new_work() {
        let mut pool = pool(2, 4);
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(pool.submit(request(0, 0, vec![0])), SubmitOutcome::Busy);
    }
}
