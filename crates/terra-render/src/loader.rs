//! Background image decoding.
//!
//! Textures are requested at scene build time and decoded on a small worker
//! pool so the first frames render immediately. The main thread collects
//! finished images once per frame with [`TextureLoader::drain_results`] and
//! uploads them; failed loads come back as errors for the caller to log.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crate::texture::TextureError;

/// Tightly packed RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Read and decode an image file, converting to RGBA8.
    pub fn open(path: &std::path::Path) -> Result<Self, TextureError> {
        let rgba = image::open(path)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// A file to decode, tagged with a caller-chosen id.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub id: usize,
    pub path: PathBuf,
}

/// Outcome of one [`LoadRequest`].
#[derive(Debug)]
pub struct LoadResult {
    pub id: usize,
    pub path: PathBuf,
    pub image: Result<DecodedImage, TextureError>,
}

/// Worker pool decoding images off the main thread.
pub struct TextureLoader {
    request_sender: Option<crossbeam_channel::Sender<LoadRequest>>,
    result_receiver: crossbeam_channel::Receiver<LoadResult>,
    worker_handles: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
}

impl TextureLoader {
    /// Spawn `worker_count` decode threads (at least one).
    pub fn new(worker_count: usize) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count.max(1));
        for index in 0..worker_count.max(1) {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            let spawned = std::thread::Builder::new()
                .name(format!("terra-texture-{index}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let image = DecodedImage::open(&request.path);
                        // Decrement first so a drained result is never still counted.
                        flight.fetch_sub(1, Ordering::AcqRel);
                        let _ = tx.send(LoadResult {
                            id: request.id,
                            path: request.path,
                            image,
                        });
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => log::error!("Failed to spawn texture worker {index}: {e}"),
            }
        }

        Self {
            request_sender: Some(request_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            in_flight,
        }
    }

    /// A pool sized to the machine, capped at four threads.
    pub fn with_defaults() -> Self {
        Self::new(num_cpus::get().clamp(1, 4))
    }

    /// Queue a decode. Returns `false` if the loader has shut down or has no workers.
    pub fn request(&self, request: LoadRequest) -> bool {
        let Some(sender) = &self.request_sender else {
            return false;
        };
        if self.worker_handles.is_empty() {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.send(request).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Collect every finished decode without blocking.
    pub fn drain_results(&self) -> Vec<LoadResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Requests queued or being decoded.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Close the request channel and join the workers.
    pub fn shutdown(&mut self) {
        self.request_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}
