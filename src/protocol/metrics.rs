//! Process-wide protocol counters
//!
//! Plain relaxed atomics; read them with [`snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Records protocol events without external dependencies.
pub(crate) struct Metrics;

static FRAMES_SENT: AtomicU64 = AtomicU64::new(0);
static FRAMES_RECEIVED: AtomicU64 = AtomicU64::new(0);
static BYTES_SENT: AtomicU64 = AtomicU64::new(0);
static BYTES_RECEIVED: AtomicU64 = AtomicU64::new(0);
static OUT_OF_BAND: AtomicU64 = AtomicU64::new(0);
static RECONNECTS: AtomicU64 = AtomicU64::new(0);
static CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static CACHE_MISSES: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

/// Direction of frame flow for counting.
#[derive(Clone, Copy)]
pub(crate) enum FrameDirection {
    Sent,
    Received,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_frame(direction: FrameDirection, frame_len: usize) {
        let len = u64::try_from(frame_len).unwrap_or(u64::MAX);
        match direction {
            FrameDirection::Sent => {
                FRAMES_SENT.fetch_add(1, Ordering::Relaxed);
                BYTES_SENT.fetch_add(len, Ordering::Relaxed);
            }
            FrameDirection::Received => {
                FRAMES_RECEIVED.fetch_add(1, Ordering::Relaxed);
                BYTES_RECEIVED.fetch_add(len, Ordering::Relaxed);
            }
        }
    }

    #[inline]
    pub(crate) fn record_out_of_band() {
        OUT_OF_BAND.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_reconnect() {
        RECONNECTS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_cache(hit: bool) {
        if hit {
            CACHE_HITS.fetch_add(1, Ordering::Relaxed);
        } else {
            CACHE_MISSES.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_error() {
        ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read every counter.
///
/// The counters are shared by all clients in the process, so tests that run in
/// parallel should compare deltas rather than absolute values.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        frames_sent: FRAMES_SENT.load(Ordering::Relaxed),
        frames_received: FRAMES_RECEIVED.load(Ordering::Relaxed),
        bytes_sent: BYTES_SENT.load(Ordering::Relaxed),
        bytes_received: BYTES_RECEIVED.load(Ordering::Relaxed),
        out_of_band: OUT_OF_BAND.load(Ordering::Relaxed),
        reconnects: RECONNECTS.load(Ordering::Relaxed),
        cache_hits: CACHE_HITS.load(Ordering::Relaxed),
        cache_misses: CACHE_MISSES.load(Ordering::Relaxed),
        errors: ERROR_COUNT.load(Ordering::Relaxed),
    }
}

/// Lightweight snapshot of the protocol counters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    /// Frames written, header included
    pub frames_sent: u64,
    /// Frames read, out-of-band ones included
    pub frames_received: u64,
    /// Bytes written in frames
    pub bytes_sent: u64,
    /// Bytes read in frames
    pub bytes_received: u64,
    /// Frames handed to the out-of-band handler
    pub out_of_band: u64,
    /// Session reconnects performed by the retry loop
    pub reconnects: u64,
    /// Reads answered from the cache
    pub cache_hits: u64,
    /// Reads that had to go to the gateway
    pub cache_misses: u64,
    /// Operations that returned an error to the caller
    pub errors: u64,
}

impl MetricsSnapshot {
    /// Share of cached reads answered without touching the network.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cache_hit_ratio(&self) -> Option<f64> {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return None;
        }
        Some(self.cache_hits as f64 / total as f64)
    }
}
