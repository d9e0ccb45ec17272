//! GPU timer query with a three-state lifecycle.
//!
//! ```text
//! Idle --start--> Running --finish--> AwaitingResult --poll (ready)--> Idle
//! ```
//!
//! Calls made in the wrong state are ignored. The query object behind a
//! [`GpuTimerQuery`] is reused every cycle and never reallocated, so a query
//! that is finished but never polled to completion stays parked in
//! `AwaitingResult` for good.

use std::sync::mpsc;

pub type Nanoseconds = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Running,
    AwaitingResult,
}

/// Outcome of asking a backend for its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPoll {
    Pending,
    /// The query completed. `None` when the backend cannot measure time.
    Ready(Option<Nanoseconds>),
}

/// The device-specific half of a timer query.
pub trait TimerBackend {
    /// Where begin/end markers are recorded.
    type Encoder;

    fn begin(&mut self, encoder: &mut Self::Encoder);
    fn end(&mut self, encoder: &mut Self::Encoder);
    fn try_read(&mut self) -> QueryPoll;
}

pub struct GpuTimerQuery<B: TimerBackend> {
    state: QueryState,
    backend: B,
}

impl<B: TimerBackend> GpuTimerQuery<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: QueryState::Idle,
            backend,
        }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn start(&mut self, encoder: &mut B::Encoder) {
        if self.state != QueryState::Idle {
            log::trace!("timer start ignored in {:?}", self.state);
            return;
        }
        self.state = QueryState::Running;
        self.backend.begin(encoder);
    }

    pub fn finish(&mut self, encoder: &mut B::Encoder) {
        if self.state != QueryState::Running {
            log::trace!("timer finish ignored in {:?}", self.state);
            return;
        }
        self.state = QueryState::AwaitingResult;
        self.backend.end(encoder);
    }

    /// Returns the elapsed GPU time exactly once per completed span.
    pub fn poll(&mut self) -> Option<Nanoseconds> {
        if self.state != QueryState::AwaitingResult {
            return None;
        }
        match self.backend.try_read() {
            QueryPoll::Pending => None,
            QueryPoll::Ready(elapsed) => {
                self.state = QueryState::Idle;
                elapsed
            }
        }
    }
}

/// Timer backend over a wgpu timestamp query set.
pub enum WgpuTimer {
    Timestamps(TimestampQuery),
    /// The device cannot write timestamps; spans complete with no value.
    Unsupported,
}

impl WgpuTimer {
    pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::TIMESTAMP_QUERY
        .union(wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS);

    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        if device.features().contains(Self::REQUIRED_FEATURES) {
            log::info!("GPU timestamp queries enabled");
            WgpuTimer::Timestamps(TimestampQuery::new(device, queue))
        } else {
            log::warn!("GPU timestamp queries unavailable, render times will be unknown");
            WgpuTimer::Unsupported
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, WgpuTimer::Timestamps(_))
    }
}

impl TimerBackend for WgpuTimer {
    type Encoder = wgpu::CommandEncoder;

    fn begin(&mut self, encoder: &mut wgpu::CommandEncoder) {
        if let WgpuTimer::Timestamps(query) = self {
            query.begin(encoder);
        }
    }

    fn end(&mut self, encoder: &mut wgpu::CommandEncoder) {
        if let WgpuTimer::Timestamps(query) = self {
            query.end(encoder);
        }
    }

    fn try_read(&mut self) -> QueryPoll {
        match self {
            WgpuTimer::Timestamps(query) => query.try_read(),
            WgpuTimer::Unsupported => QueryPoll::Ready(None),
        }
    }
}

const TIMESTAMP_COUNT: u32 = 2;
const TIMESTAMP_BYTES: u64 = TIMESTAMP_COUNT as u64 * wgpu::QUERY_SIZE as u64;

/// Begin/end timestamp pair with its resolve and readback buffers.
pub struct TimestampQuery {
    query_set: wgpu::QuerySet,
    resolve_buffer: wgpu::Buffer,
    readback_buffer: wgpu::Buffer,
    period_ns: f64,
    pending_map: Option<mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>>,
}

impl TimestampQuery {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("Frame Timer Query Set"),
            ty: wgpu::QueryType::Timestamp,
            count: TIMESTAMP_COUNT,
        });
        let resolve_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Timer Resolve Buffer"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Timer Readback Buffer"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            query_set,
            resolve_buffer,
            readback_buffer,
            period_ns: queue.get_timestamp_period() as f64,
            pending_map: None,
        }
    }

    fn begin(&mut self, encoder: &mut wgpu::CommandEncoder) {
        encoder.write_timestamp(&self.query_set, 0);
    }

    fn end(&mut self, encoder: &mut wgpu::CommandEncoder) {
        encoder.write_timestamp(&self.query_set, 1);
        encoder.resolve_query_set(&self.query_set, 0..TIMESTAMP_COUNT, &self.resolve_buffer, 0);
        encoder.copy_buffer_to_buffer(
            &self.resolve_buffer,
            0,
            &self.readback_buffer,
            0,
            TIMESTAMP_BYTES,
        );
    }

    /// The first call after submission requests the readback mapping; later
    /// calls check whether it has landed. The caller drives completion with
    /// `Device::poll`.
    fn try_read(&mut self) -> QueryPoll {
        let Some(receiver) = self.pending_map.take() else {
            let (tx, rx) = mpsc::channel();
            self.readback_buffer
                .slice(..)
                .map_async(wgpu::MapMode::Read, move |result| {
                    tx.send(result).ok();
                });
            self.pending_map = Some(rx);
            return QueryPoll::Pending;
        };

        let mapped = match receiver.try_recv() {
            Err(mpsc::TryRecvError::Empty) => {
                self.pending_map = Some(receiver);
                return QueryPoll::Pending;
            }
            Err(mpsc::TryRecvError::Disconnected) => false,
            Ok(result) => result.is_ok(),
        };

        if !mapped {
            log::warn!("timer readback mapping failed, dropping sample");
            return QueryPoll::Ready(None);
        }

        let elapsed = {
            let view = self.readback_buffer.slice(..).get_mapped_range();
            let begin: u64 = bytemuck::pod_read_unaligned(&view[0..8]);
            let end: u64 = bytemuck::pod_read_unaligned(&view[8..16]);
            (end.saturating_sub(begin) as f64 * self.period_ns) as Nanoseconds
        };
        self.readback_buffer.unmap();
        QueryPoll::Ready(Some(elapsed))
    }
}
