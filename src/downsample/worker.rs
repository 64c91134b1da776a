//! Background worker that runs a [`Downsampler`] off the UI thread
//!
//! Requests queue up while a pass is running. When the worker wakes it drains
//! the queue, applies every update in order and computes only the newest
//! downsample request, so the UI never waits on a backlog.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::orchestrator::{Downsampler, StateUpdate};
use super::Dataset;
use crate::config::DownsampleConfig;

/// Requests that can be sent to the background worker
pub enum WorkerRequest {
    /// Merge new state into the downsampler
    Update(StateUpdate),
    /// Run a downsample pass tagged with `generation`
    Downsample { generation: u64 },
    /// Shutdown the worker
    Shutdown,
}

/// Output of one downsample pass
#[derive(Debug, Clone)]
pub struct DownsampleResult {
    pub generation: u64,
    pub datasets: Option<Vec<Dataset>>,
}

pub struct DownsampleWorker {
    tx: Sender<WorkerRequest>,
    rx: Receiver<DownsampleResult>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl DownsampleWorker {
    /// Spawn a new background worker thread
    pub fn spawn(config: DownsampleConfig) -> Self {
        let (req_tx, req_rx) = channel::<WorkerRequest>();
        let (res_tx, res_rx) = channel::<DownsampleResult>();

        let handle = thread::Builder::new()
            .name("downsample-worker".into())
            .spawn(move || Self::worker_loop(Downsampler::new(config), req_rx, res_tx))
            .map_err(|e| log::error!("failed to spawn downsample worker: {}", e))
            .ok();

        Self {
            tx: req_tx,
            rx: res_rx,
            handle,
            generation: 0,
        }
    }

    fn worker_loop(
        mut downsampler: Downsampler,
        rx: Receiver<WorkerRequest>,
        tx: Sender<DownsampleResult>,
    ) {
        while let Ok(first) = rx.recv() {
            let mut pending = None;
            for request in std::iter::once(first).chain(rx.try_iter()) {
                match request {
                    WorkerRequest::Update(update) => downsampler.update(update),
                    WorkerRequest::Downsample { generation } => {
                        if pending.is_some() {
                            log::trace!("dropping superseded downsample request");
                        }
                        pending = Some(generation);
                    }
                    WorkerRequest::Shutdown => return,
                }
            }

            if let Some(generation) = pending {
                let datasets = downsampler.downsample();
                if tx.send(DownsampleResult { generation, datasets }).is_err() {
                    break;
                }
            }
        }
    }

    /// Merge state into the worker's downsampler (non-blocking)
    pub fn update(&self, update: StateUpdate) {
        self.send(WorkerRequest::Update(update));
    }

    /// Ask for a pass over the current state; returns its generation
    pub fn request(&mut self) -> u64 {
        self.generation += 1;
        self.send(WorkerRequest::Downsample {
            generation: self.generation,
        });
        self.generation
    }

    /// Generation of the most recent request
    pub fn latest_generation(&self) -> u64 {
        self.generation
    }

    /// Newest finished result, discarding older ones (non-blocking)
    pub fn poll(&self) -> Option<DownsampleResult> {
        self.rx.try_iter().last()
    }

    /// Block until a result is available or `timeout` elapses
    pub fn wait(&self, timeout: Duration) -> Option<DownsampleResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => Some(self.poll().unwrap_or(first)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn send(&self, request: WorkerRequest) {
        if self.tx.send(request).is_err() {
            log::warn!("downsample worker is gone, request dropped");
        }
    }
}

impl Drop for DownsampleWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Default for DownsampleWorker {
    fn default() -> Self {
        Self::spawn(DownsampleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downsample::{DatasetMeta, Scale, Scales, StatePoint};

    fn full_update() -> StateUpdate {
        let points = (0..1_000)
            .map(|i| {
                let label = if (i / 10) % 2 == 0 { "LOW" } else { "HIGH" };
                StatePoint::new(i as f64, 0.0).with_label(label).into()
            })
            .collect();
        let dataset = Dataset::new(DatasetMeta::new("trace", [0, 0, 255, 255]), points);
        let bounds = dataset.bounds().unwrap();
        StateUpdate::new()
            .with_datasets(vec![dataset])
            .with_dataset_bounds(bounds)
            .with_scales(Scales {
                x: Scale {
                    min: 0.0,
                    max: 1_000.0,
                    pixel_start: 0.0,
                    pixel_end: 100.0,
                },
                y: Scale {
                    min: 0.0,
                    max: 1.0,
                    pixel_start: 50.0,
                    pixel_end: 0.0,
                },
            })
    }

    #[test]
    fn test_worker_round_trip() {
        let mut worker = DownsampleWorker::default();
        worker.update(full_update());
        let generation = worker.request();

        let result = worker.wait(Duration::from_secs(5)).expect("worker result");
        assert_eq!(result.generation, generation);
        let datasets = result.datasets.expect("bounds were provided");
        assert_eq!(datasets.len(), 1);
        assert!(datasets[0].len() < 1_000);
    }

    #[test]
    fn test_worker_without_bounds_yields_none() {
        let mut worker = DownsampleWorker::default();
        worker.request();
        let result = worker.wait(Duration::from_secs(5)).expect("worker result");
        assert!(result.datasets.is_none());
    }

    #[test]
    fn test_worker_reaches_latest_generation() {
        let mut worker = DownsampleWorker::default();
        worker.update(full_update());
        for _ in 0..5 {
            worker.request();
        }
        assert_eq!(worker.latest_generation(), 5);

        let mut seen = 0;
        while seen < 5 {
            match worker.wait(Duration::from_secs(5)) {
                Some(result) => {
                    assert!(result.generation > seen);
                    seen = result.generation;
                }
                None => panic!("worker stopped before generation 5"),
            }
        }
        assert!(worker.poll().is_none());
    }

    #[test]
    fn test_worker_shuts_down_on_drop() {
        let worker = DownsampleWorker::default();
        drop(worker);
    }
}
