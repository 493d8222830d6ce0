use crate::dispatcher::{Dispatcher, Publisher};
use crate::error::BridgeError;
use crate::frame::LinFrame;
use tracing::{debug, info};

/// Anything that delivers LIN frames: the USB adapter, a replay, a test.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Waits for the next frame. `Ok(None)` means the read window passed
    /// without one.
    async fn next_frame(&mut self) -> Result<Option<LinFrame>, BridgeError>;
}

/// Stop condition for the polling loop: stop after `count` accepted
/// frames, or never when the count is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleLimit {
    count: u64,
}

impl SampleLimit {
    pub fn new(count: u64) -> Self {
        Self { count }
    }

    pub fn unlimited() -> Self {
        Self { count: 0 }
    }

    pub fn is_unlimited(&self) -> bool {
        self.count == 0
    }

    pub fn reached(&self, accepted: u64) -> bool {
        !self.is_unlimited() && accepted >= self.count
    }
}

/// Feeds frames from `source` into `dispatcher` until `limit` is reached
/// or the source fails. Returns the number of accepted frames.
pub async fn run<S, P>(source: &mut S, dispatcher: &mut Dispatcher<P>, limit: SampleLimit) -> Result<u64, BridgeError>
where
    S: FrameSource,
    P: Publisher,
{
    info!("--- Entering Frame Polling Loop ---");
    while !limit.reached(dispatcher.frames_accepted()) {
        let Some(frame) = source.next_frame().await? else {
            continue;
        };
        if !dispatcher.handle_frame(&frame) {
            debug!(id = frame.id, "Ignoring non-status frame");
        }
    }
    info!("Sample limit reached after {} frames.", dispatcher.frames_accepted());
    Ok(dispatcher.frames_accepted())
}
