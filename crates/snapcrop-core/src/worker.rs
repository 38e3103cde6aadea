//! Background detection and extraction.
//!
//! [`CropWorker`] owns one thread that runs requests in submission order.
//! Every request gets a job id; the worker only cares about the most
//! recent one. Results for superseded jobs, or for jobs dismissed before
//! they finished, are dropped when they arrive.
//!
//! Dropping the worker never waits for the thread: the request channel is
//! closed and the thread exits once its current job is done.

use std::sync::{mpsc, Arc};
use std::thread;

use thiserror::Error;

use crate::decode::DecodedImage;
use crate::detect::{detect_quad, DetectedQuad, RectangleDetector};
use crate::geometry::{Quad, Size};
use crate::transform::{extract, CropError};

/// Detector shareable with the worker thread.
pub type SharedDetector = Arc<dyn RectangleDetector + Send + Sync>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to start worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("worker thread has stopped")]
    Disconnected,
}

/// What a finished job produced.
#[derive(Debug)]
pub enum JobOutcome {
    Detected(Option<DetectedQuad>),
    Extracted(Result<DecodedImage, CropError>),
}

#[derive(Debug)]
pub struct JobResult {
    pub job_id: u64,
    pub outcome: JobOutcome,
}

enum Request {
    Detect {
        job_id: u64,
        image: Arc<DecodedImage>,
        detector: SharedDetector,
    },
    Extract {
        job_id: u64,
        image: Arc<DecodedImage>,
        corners: Quad,
        display_size: Size,
    },
}

impl Request {
    fn run(self) -> JobResult {
        match self {
            Request::Detect {
                job_id,
                image,
                detector,
            } => JobResult {
                job_id,
                outcome: JobOutcome::Detected(detect_quad(&image, detector.as_ref())),
            },
            Request::Extract {
                job_id,
                image,
                corners,
                display_size,
            } => JobResult {
                job_id,
                outcome: JobOutcome::Extracted(extract(&image, &corners, display_size)),
            },
        }
    }
}

/// Tracks the one job whose result is still wanted.
#[derive(Debug, Default)]
struct JobSlot {
    counter: u64,
    current: Option<u64>,
}

impl JobSlot {
    fn next(&mut self) -> u64 {
        self.counter += 1;
        self.current = Some(self.counter);
        self.counter
    }

    /// Accept `job_id` if it is the current job, clearing the slot.
    fn take(&mut self, job_id: u64) -> bool {
        if self.current == Some(job_id) {
            self.current = None;
            true
        } else {
            false
        }
    }
}

/// Single background thread for detection and extraction jobs.
pub struct CropWorker {
    request_tx: mpsc::Sender<Request>,
    result_rx: mpsc::Receiver<JobResult>,
    slot: JobSlot,
}

impl CropWorker {
    pub fn spawn() -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (result_tx, result_rx) = mpsc::channel();

        // Detached: the handle is never joined.
        let _ = thread::Builder::new()
            .name("snapcrop-worker".into())
            .spawn(move || {
                for request in request_rx {
                    if result_tx.send(request.run()).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            slot: JobSlot::default(),
        })
    }

    /// Id of the job whose result is still wanted, if any.
    pub fn current_job(&self) -> Option<u64> {
        self.slot.current
    }

    /// Queue a detection pass. Supersedes any pending job.
    pub fn submit_detection(
        &mut self,
        image: Arc<DecodedImage>,
        detector: SharedDetector,
    ) -> Result<u64, WorkerError> {
        let job_id = self.slot.next();
        log::debug!("queueing detection job {}", job_id);
        self.send(Request::Detect {
            job_id,
            image,
            detector,
        })?;
        Ok(job_id)
    }

    /// Queue a perspective extraction. Supersedes any pending job.
    pub fn submit_extraction(
        &mut self,
        image: Arc<DecodedImage>,
        corners: Quad,
        display_size: Size,
    ) -> Result<u64, WorkerError> {
        let job_id = self.slot.next();
        log::debug!("queueing extraction job {}", job_id);
        self.send(Request::Extract {
            job_id,
            image,
            corners,
            display_size,
        })?;
        Ok(job_id)
    }

    /// Forget the pending job; its result will be dropped on arrival.
    pub fn dismiss(&mut self) {
        if let Some(job_id) = self.slot.current.take() {
            log::debug!("dismissed job {}", job_id);
        }
    }

    /// Non-blocking check for the current job's result.
    pub fn poll(&mut self) -> Option<JobResult> {
        while let Ok(result) = self.result_rx.try_recv() {
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }

    /// Block until the current job finishes. `None` when no job is
    /// pending or the worker stopped.
    pub fn wait(&mut self) -> Option<JobResult> {
        while self.slot.current.is_some() {
            let result = self.result_rx.recv().ok()?;
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }

    fn send(&mut self, request: Request) -> Result<(), WorkerError> {
        self.request_tx.send(request).map_err(|_| {
            self.slot.current = None;
            WorkerError::Disconnected
        })
    }

    fn accept(&mut self, result: JobResult) -> Option<JobResult> {
        if self.slot.take(result.job_id) {
            log::info!("job {} finished", result.job_id);
            Some(result)
        } else {
            log::info!("ignoring stale result for job {}", result.job_id);
            None
        }
    }
}

impl Drop for CropWorker {
    fn drop(&mut self) {
        if let Some(job_id) = self.slot.current.take() {
            log::info!("worker dropped with job {} in flight", job_id);
        }
    }
}
