//! Producer side of the sample pipeline.
//!
//! Samples are pulled from a blocking iterator on a dedicated blocking thread
//! and pushed into a bounded channel. A full channel blocks the producer, so a
//! slow consumer throttles the source instead of samples piling up.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::sample::Sample;

/// Queue depth used when nothing else is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Starts pushing `samples` into a new channel of `capacity` slots.
///
/// The producer stops when the iterator is exhausted, when `cancel` fires, or
/// when the receiver is dropped. In every case the iterator (and with it any
/// file or child process it owns) is dropped on the producer thread before
/// the join handle completes. The handle yields the number of samples sent.
///
/// Must be called from within a tokio runtime.
pub fn spawn_producer<I>(
    samples: I,
    capacity: usize,
    cancel: CancellationToken,
) -> (mpsc::Receiver<Sample>, JoinHandle<usize>)
where
    I: IntoIterator<Item = Sample>,
    I::IntoIter: Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let samples = samples.into_iter();

    let handle = tokio::task::spawn_blocking(move || {
        let mut sent = 0;
        for sample in samples {
            if cancel.is_cancelled() {
                debug!("Producer cancelled after {} samples", sent);
                break;
            }
            if tx.blocking_send(sample).is_err() {
                debug!("Consumer went away after {} samples", sent);
                break;
            }
            sent += 1;
        }
        sent
    });

    (rx, handle)
}
