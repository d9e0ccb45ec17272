use msdf_text_bench::timer_query::{
    GpuTimerQuery, QueryPoll, QueryState, TimerBackend, WgpuTimer,
};
use msdf_text_bench::FrameStatistics;

/// Backend that reports `pending_polls` pending reads before each result.
#[derive(Default)]
struct ScriptedBackend {
    pending_polls: u32,
    elapsed: Option<u64>,
    remaining: u32,
    begins: u32,
    ends: u32,
    reads: u32,
}

impl ScriptedBackend {
    fn new(pending_polls: u32, elapsed: Option<u64>) -> Self {
        Self {
            pending_polls,
            elapsed,
            ..Default::default()
        }
    }
}

impl TimerBackend for ScriptedBackend {
    type Encoder = ();

    fn begin(&mut self, _encoder: &mut ()) {
        self.begins += 1;
    }

    fn end(&mut self, _encoder: &mut ()) {
        self.ends += 1;
        self.remaining = self.pending_polls;
    }

    fn try_read(&mut self) -> QueryPoll {
        self.reads += 1;
        if self.remaining > 0 {
            self.remaining -= 1;
            QueryPoll::Pending
        } else {
            QueryPoll::Ready(self.elapsed)
        }
    }
}

#[test]
fn poll_before_start_yields_nothing() {
    let mut timer = GpuTimerQuery::new(ScriptedBackend::new(0, Some(5)));

    assert_eq!(timer.poll(), None);
    assert_eq!(timer.state(), QueryState::Idle);
    assert_eq!(timer.backend().reads, 0);
}

#[test]
fn lifecycle_moves_through_states() {
    let mut timer = GpuTimerQuery::new(ScriptedBackend::new(0, Some(1_500)));

    timer.start(&mut ());
    assert_eq!(timer.state(), QueryState::Running);
    timer.finish(&mut ());
    assert_eq!(timer.state(), QueryState::AwaitingResult);
    assert_eq!(timer.poll(), Some(1_500));
    assert_eq!(timer.state(), QueryState::Idle);
}

#[test]
fn pending_result_is_delivered_exactly_once() {
    let mut timer = GpuTimerQuery::new(ScriptedBackend::new(3, Some(2_000_000)));
    timer.start(&mut ());
    timer.finish(&mut ());

    for _ in 0..3 {
        assert_eq!(timer.poll(), None);
        assert_eq!(timer.state(), QueryState::AwaitingResult);
    }
    assert_eq!(timer.poll(), Some(2_000_000));
    for _ in 0..5 {
        assert_eq!(timer.poll(), None);
    }
    assert_eq!(timer.backend().reads, 4);
}

#[test]
fn delayed_result_adds_one_sample_to_statistics() {
    let mut timer = GpuTimerQuery::new(ScriptedBackend::new(3, Some(2_500_000)));
    let mut stats = FrameStatistics::new();
    timer.start(&mut ());
    timer.finish(&mut ());

    for _ in 0..10 {
        if let Some(elapsed) = timer.poll() {
            stats.record_gpu_time(elapsed);
        }
    }

    assert_eq!(stats.sample_count(), 1);
    assert_eq!(stats.render_time, Some(2.5));
}

#[test]
fn out_of_order_calls_are_ignored() {
    let mut timer = GpuTimerQuery::new(ScriptedBackend::new(0, Some(10)));

    timer.finish(&mut ());
    assert_eq!(timer.state(), QueryState::Idle);
    assert_eq!(timer.backend().ends, 0);

    timer.start(&mut ());
    timer.start(&mut ());
    assert_eq!(timer.backend().begins, 1);
    assert_eq!(timer.poll(), None);
    assert_eq!(timer.state(), QueryState::Running);

    timer.finish(&mut ());
    timer.finish(&mut ());
    timer.start(&mut ());
    assert_eq!(timer.backend().ends, 1);
    assert_eq!(timer.backend().begins, 1);
    assert_eq!(timer.state(), QueryState::AwaitingResult);
}

#[test]
fn arbitrary_call_sequences_report_one_value_per_span() {
    let mut timer = GpuTimerQuery::new(ScriptedBackend::new(2, Some(7)));
    let mut seed: u32 = 0x2545_f491;
    let mut finished_spans = 0;
    let mut values = 0;

    for _ in 0..2_000 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let before = timer.state();
        match seed % 3 {
            0 => timer.start(&mut ()),
            1 => {
                timer.finish(&mut ());
                if before == QueryState::Running {
                    finished_spans += 1;
                }
            }
            _ => {
                if timer.poll().is_some() {
                    assert_eq!(before, QueryState::AwaitingResult);
                    values += 1;
                }
            }
        }
        assert!(matches!(
            timer.state(),
            QueryState::Idle | QueryState::Running | QueryState::AwaitingResult
        ));
    }

    let outstanding = u32::from(timer.state() == QueryState::AwaitingResult);
    assert_eq!(values + outstanding, finished_spans);
    let running = u32::from(timer.state() == QueryState::Running);
    assert_eq!(timer.backend().begins, timer.backend().ends + running);
}

#[test]
fn backend_without_timing_completes_span_without_value() {
    let mut timer = GpuTimerQuery::new(ScriptedBackend::new(1, None));
    timer.start(&mut ());
    timer.finish(&mut ());

    assert_eq!(timer.poll(), None);
    assert_eq!(timer.state(), QueryState::AwaitingResult);
    assert_eq!(timer.poll(), None);
    assert_eq!(timer.state(), QueryState::Idle);

    timer.start(&mut ());
    assert_eq!(timer.state(), QueryState::Running);
}

#[test]
fn unsupported_device_reads_ready_without_value() {
    let mut backend = WgpuTimer::Unsupported;

    assert!(!backend.is_supported());
    assert_eq!(backend.try_read(), QueryPoll::Ready(None));
}
