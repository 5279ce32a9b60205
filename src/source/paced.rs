use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select};

use super::SampleSource;
use crate::config::SampleRate;
use crate::error::Result;

/// Replays another source in real time
///
/// A worker thread pulls from the wrapped source and releases one sample
/// per sampling period, the way the board's timer interrupt feeds the
/// detector. Samples are delivered in chunks of `chunk_size`; a chunk size
/// of 1 gives one buffer per tick.
///
/// An error from the wrapped source is returned by `next_buffer` after the
/// samples read before it; the stream ends there. Dropping the source stops
/// the worker.
pub struct PacedSource {
    rx: Receiver<Result<Vec<u16>>>,
    sample_rate: SampleRate,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PacedSource {
    pub fn new(mut inner: Box<dyn SampleSource>, chunk_size: usize) -> Result<Self> {
        let sample_rate = inner.sample_rate();
        let period = Duration::from_secs_f32(1.0 / sample_rate.as_hz());
        let chunk_size = chunk_size.max(1);

        let (tx, rx) = crossbeam_channel::bounded(10);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("sample-pacer".into())
            .spawn(move || {
                let ticker = crossbeam_channel::tick(period);
                let mut chunk = Vec::with_capacity(chunk_size);

                loop {
                    let buffer = match inner.next_buffer() {
                        Ok(Some(buffer)) => buffer,
                        Ok(None) => break,
                        Err(e) => {
                            log::warn!("Paced source stopped: {}", e);
                            if !chunk.is_empty() {
                                let _ = tx.send(Ok(std::mem::take(&mut chunk)));
                            }
                            let _ = tx.send(Err(e));
                            return;
                        }
                    };

                    for sample in buffer {
                        select! {
                            recv(stop_rx) -> _ => return,
                            recv(ticker) -> _ => {}
                        }
                        chunk.push(sample);
                        if chunk.len() >= chunk_size && tx.send(Ok(std::mem::take(&mut chunk))).is_err() {
                            return;
                        }
                    }
                }

                if !chunk.is_empty() {
                    let _ = tx.send(Ok(chunk));
                }
                log::debug!("Paced source exhausted");
            })?;

        log::info!("Pacing samples at {} ({:?} per tick)", sample_rate, period);

        Ok(Self {
            rx,
            sample_rate,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

impl SampleSource for PacedSource {
    fn next_buffer(&mut self) -> Result<Option<Vec<u16>>> {
        match self.rx.recv() {
            Ok(data) => data.map(Some),
            Err(_) => Ok(None),
        }
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

impl Drop for PacedSource {
    fn drop(&mut self) {
        // Disconnecting both channels unblocks the worker wherever it waits.
        self.stop_tx.take();
        self.rx = crossbeam_channel::never();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
