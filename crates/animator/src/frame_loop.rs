/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host that can schedule a callback for the next display refresh.
pub trait FrameHost {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Self-rearming frame loop.
///
/// Holds at most one pending request. A frame runs only when the host
/// delivers the handle that is pending; anything else is stale.
#[derive(Debug, Default)]
pub struct FrameLoop {
    pending: Option<FrameHandle>,
    running: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the first frame. No-op if already running.
    pub fn start(&mut self, host: &mut impl FrameHost) {
        if self.running {
            return;
        }
        self.running = true;
        self.pending = Some(host.request_frame());
        tracing::debug!("frame loop started");
    }

    /// Accept a delivered frame. Returns false for stale or cancelled handles.
    pub fn begin_frame(&mut self, handle: FrameHandle) -> bool {
        if self.running && self.pending == Some(handle) {
            self.pending = None;
            self.frames += 1;
            true
        } else {
            false
        }
    }

    /// Request the next frame while the loop is running.
    pub fn rearm(&mut self, host: &mut impl FrameHost) {
        if self.running && self.pending.is_none() {
            self.pending = Some(host.request_frame());
        }
    }

    /// Stop the loop and release any pending request.
    pub fn cancel(&mut self, host: &mut impl FrameHost) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        tracing::debug!(frames = self.frames, "frame loop cancelled");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Frames accepted since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
