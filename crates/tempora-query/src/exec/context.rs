//! Execution context for query plans.

use tempora_store::CancellationToken;

/// Default capacity of the fetch multiplexing channel.
pub const DEFAULT_CHAN_SIZE: usize = 1024;

/// Runtime state shared by every stage of one plan execution.
///
/// The context carries the cancellation token observed by the driver and
/// by every store call, and the capacity of the bounded channel that
/// multiplexes per-graph fetch results. The channel capacity only
/// affects backpressure, never semantics.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    cancellation: CancellationToken,
    chan_size: usize,
}

impl ExecutionContext {
    /// Creates a context with a fresh token and the default channel
    /// capacity.
    #[must_use]
    pub fn new() -> Self {
        Self { cancellation: CancellationToken::new(), chan_size: DEFAULT_CHAN_SIZE }
    }

    /// Uses the given token, so the caller can cancel from outside.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Overrides the fetch channel capacity. A capacity of zero is
    /// raised to one.
    #[must_use]
    pub fn with_chan_size(mut self, chan_size: usize) -> Self {
        self.chan_size = chan_size.max(1);
        self
    }

    /// The cancellation token.
    #[inline]
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The fetch channel capacity.
    #[inline]
    #[must_use]
    pub fn chan_size(&self) -> usize {
        self.chan_size
    }

    /// Whether cancellation was requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
