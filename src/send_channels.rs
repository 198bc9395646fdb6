//! Runs a detector on its own thread, fed through channels.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use image::RgbImage;
use crate::common::DetectOutput;
use crate::detection_runners::Model;
use crate::detectors::Detector;
use crate::errors::DetectError;
use crate::Result;

type Request = (u64, Box<RgbImage>);
type Reply = (u64, Result<DetectOutput>);

/// Worker side of the channels.
#[derive(Debug)]
pub struct DetectionState {
    pub img_rx: Receiver<Request>,
    pub det_tx: Sender<Reply>,
}

/// Caller side of the channels. Dropping it stops the worker.
#[derive(Debug)]
pub struct SendState {
    img_tx: Sender<Request>,
    det_rx: Receiver<Reply>,
    next_id: u64,
}

impl SendState {
    fn submit(&mut self, image: RgbImage) -> Result<u64> {
        let id = self.next_id;
        self.next_id += 1;
        self.img_tx
            .send((id, Box::new(image)))
            .map_err(|_| DetectError::WorkerDisconnected)?;
        Ok(id)
    }

    /// Sends `image` to the worker and blocks until its result arrives.
    pub fn detect(&mut self, image: RgbImage) -> Result<DetectOutput> {
        let id = self.submit(image)?;
        loop {
            match self.det_rx.recv() {
                Ok((reply_id, result)) if reply_id == id => return result,
                // reply to a request that already timed out
                Ok(_) => continue,
                Err(_) => return Err(DetectError::WorkerDisconnected),
            }
        }
    }

    /// Like [`SendState::detect`] but gives up after `timeout`. The worker still
    /// finishes the request; its late reply is discarded. A timeout too large
    /// to add to the current instant waits like [`SendState::detect`].
    pub fn detect_timeout(&mut self, image: RgbImage, timeout: Duration) -> Result<DetectOutput> {
        // too far out to represent, so there is no deadline at all
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.detect(image);
        };
        let id = self.submit(image)?;
        loop {
            match self.det_rx.recv_deadline(deadline) {
                Ok((reply_id, result)) if reply_id == id => return result,
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => return Err(DetectError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => return Err(DetectError::WorkerDisconnected),
            }
        }
    }
}

/// Moves `detector` onto a dedicated thread. Each image is processed with the
/// split grid from the detector's configuration.
pub fn spawn_detector<M: Model + 'static>(detector: Detector<M>) -> std::io::Result<(SendState, JoinHandle<()>)> {
    let (img_tx, img_rx) = crossbeam_channel::unbounded();
    let (det_tx, det_rx) = crossbeam_channel::unbounded();
    let state = DetectionState { img_rx, det_tx };

    let handle = thread::Builder::new()
        .name("split-detect".to_string())
        .spawn(move || detection_loop(detector, state))?;

    Ok((SendState { img_tx, det_rx, next_id: 0 }, handle))
}

fn detection_loop<M: Model>(detector: Detector<M>, state: DetectionState) {
    log::info!("Detection worker started");
    while let Ok((id, image)) = state.img_rx.recv() {
        let result = detector.run(&image);
        if let Err(err) = &result {
            log::error!("Detection request {} failed: {}", id, err);
        }
        if state.det_tx.send((id, result)).is_err() {
            break;
        }
    }
    log::info!("Detection worker stopped");
}
