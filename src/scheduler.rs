/// Frame request handle owned by a renderer.
///
/// The host asks for a redraw whenever [`FrameScheduler::is_running`] is
/// true and renders only when [`FrameScheduler::take_request`] hands out the
/// pending request. Stopping drops any request that is still outstanding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameScheduler {
    running: bool,
    pending: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("frame loop started");
        }
        self.running = true;
        self.pending = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("frame loop stopped");
        }
        self.running = false;
        self.pending = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_request(&self) -> bool {
        self.pending
    }

    /// Consumes the pending request, if any.
    pub fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Queues the next frame after one completes, unless stopped meanwhile.
    pub fn rearm(&mut self) {
        self.pending = self.running;
    }
}
