//! End-to-end scenario tests against fake in-memory source/sink
//! implementations — no real child process or clock-accurate sleep
//! required to exercise the supervisor's state machine.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use playback_types::{InputKind, PlaybackEndReason, RepeatMode, SinkError, SourceError, Track};
use playbackengine::{AudioSink, AudioSource, Listener, PacingSink, PcmReader, PcmWriter, PlaybackEvent, PlaybackLoop};

fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(lovely_env_logger::init_default);
}

fn track(uri: &str) -> Track {
    Track::new(uri, uri, InputKind::LocalFile)
}

#[derive(Default)]
struct EventLog(Mutex<Vec<PlaybackEvent>>);

impl Listener for EventLog {
    fn on_event(&self, event: &PlaybackEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

impl EventLog {
    fn snapshot(&self) -> Vec<PlaybackEvent> {
        self.0.lock().unwrap().clone()
    }
}

/// A reader that yields a fixed byte count in bounded chunks, then EOFs.
struct FiniteReader {
    remaining: usize,
    chunk: usize,
    fail_with_code: Option<i32>,
}

#[async_trait]
impl PcmReader for FiniteReader {
    async fn read(&mut self, buffer: &mut [u8], _cancel: &CancellationToken) -> Result<usize, SourceError> {
        if self.remaining == 0 {
            if let Some(code) = self.fail_with_code {
                return Err(SourceError::PipelineFailed { child: "decoder", code });
            }
            return Ok(0);
        }
        let n = self.remaining.min(self.chunk).min(buffer.len());
        self.remaining -= n;
        Ok(n)
    }

    async fn close(&mut self) {}
}

/// A reader that never naturally EOFs; only cancellation ends it. Used to
/// simulate "currently playing" for pre-emption/ordering scenarios.
struct InfiniteReader;

#[async_trait]
impl PcmReader for InfiniteReader {
    async fn read(&mut self, buffer: &mut [u8], cancel: &CancellationToken) -> Result<usize, SourceError> {
        tokio::select! {
            () = cancel.cancelled() => Ok(0),
            () = tokio::time::sleep(Duration::from_millis(2)) => {
                let n = buffer.len().min(256);
                Ok(n)
            }
        }
    }

    async fn close(&mut self) {}
}

enum FakeTrack {
    Finite { bytes: usize, fail_with_code: Option<i32> },
    Infinite,
}

struct FakeSource {
    tracks: Mutex<std::collections::HashMap<String, FakeTrack>>,
}

impl FakeSource {
    fn new(tracks: Vec<(&str, FakeTrack)>) -> Self {
        Self {
            tracks: Mutex::new(tracks.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
        }
    }
}

#[async_trait]
impl AudioSource for FakeSource {
    async fn open_reader(
        &self,
        track: &Track,
        _cancel: &CancellationToken,
    ) -> Result<Box<dyn PcmReader>, SourceError> {
        match self.tracks.lock().unwrap().get(&track.uri) {
            Some(FakeTrack::Finite { bytes, fail_with_code }) => Ok(Box::new(FiniteReader {
                remaining: *bytes,
                chunk: 16 * 1024,
                fail_with_code: *fail_with_code,
            })),
            Some(FakeTrack::Infinite) | None => Ok(Box::new(InfiniteReader)),
        }
    }
}

#[derive(Clone, Default)]
struct InMemoryWriter;

#[async_trait]
impl PcmWriter for InMemoryWriter {
    async fn write_all(&mut self, _buffer: &[u8]) -> Result<(), SinkError> {
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if check() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

#[tokio::test(start_paused = true)]
async fn s1_basic_play_completes_with_paced_delay() {
    init_logging();
    let log = Arc::new(EventLog::default());
    let source = Arc::new(FakeSource::new(vec![(
        "t1",
        FakeTrack::Finite {
            bytes: 2 * playbackengine::sink::PCM_BYTE_RATE as usize,
            fail_with_code: None,
        },
    )]));
    let sink = Arc::new(PacingSink::new(InMemoryWriter));
    let handle = PlaybackLoop::spawn(16, source, sink, vec![log.clone()]);

    let start = tokio::time::Instant::now();
    handle.enqueue_tracks(vec![track("t1")]).await;
    wait_until(|| {
        log.snapshot()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::OnSessionEnded(_, r) if r.reason == PlaybackEndReason::Completed))
    })
    .await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(1900), "expected >=1.9s of paced delay, got {elapsed:?}");

    let events = log.snapshot();
    assert!(events.iter().any(|e| *e == PlaybackEvent::OnStateChanged(playback_types::PlayerState::Playing)));
    assert!(events.iter().any(|e| matches!(e, PlaybackEvent::OnTrackChanged(Some(t)) if t.uri == "t1")));

    handle.dispose().await;
}

#[tokio::test]
async fn s2_play_now_preempts_without_going_idle() {
    init_logging();
    let log = Arc::new(EventLog::default());
    let source = Arc::new(FakeSource::new(vec![("t1", FakeTrack::Infinite)]));
    let sink = Arc::new(PacingSink::new(InMemoryWriter));
    let handle = PlaybackLoop::spawn(16, source, sink, vec![log.clone()]);

    handle.enqueue_tracks(vec![track("t1")]).await;
    wait_until(|| handle.state() == playback_types::PlayerState::Playing).await;

    handle.play_now(track("t2")).await;
    wait_until(|| {
        log.snapshot()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::OnTrackChanged(Some(t)) if t.uri == "t2"))
    })
    .await;

    let events = log.snapshot();
    let t1_cancelled = events
        .iter()
        .position(|e| matches!(e, PlaybackEvent::OnSessionEnded(t, r) if t.uri == "t1" && r.reason == PlaybackEndReason::Cancelled))
        .expect("t1 must end cancelled");
    let t2_changed = events
        .iter()
        .position(|e| matches!(e, PlaybackEvent::OnTrackChanged(Some(t)) if t.uri == "t2"))
        .unwrap();
    assert!(t1_cancelled < t2_changed, "t1's cancellation must be observed before t2 starts");
    assert!(!events.contains(&PlaybackEvent::OnStateChanged(playback_types::PlayerState::Idle)));

    handle.dispose().await;
}

#[tokio::test]
async fn s3_repeat_all_cycles_the_queue() {
    init_logging();
    let log = Arc::new(EventLog::default());
    let source = Arc::new(FakeSource::new(vec![
        ("t1", FakeTrack::Finite { bytes: 1024, fail_with_code: None }),
        ("t2", FakeTrack::Finite { bytes: 1024, fail_with_code: None }),
    ]));
    let sink = Arc::new(PacingSink::new(InMemoryWriter));
    let handle = PlaybackLoop::spawn(16, source, sink, vec![log.clone()]);

    handle.set_repeat_mode(RepeatMode::All);
    handle.enqueue_tracks(vec![track("t1"), track("t2")]).await;

    wait_until(|| {
        let completions = log
            .snapshot()
            .iter()
            .filter(|e| matches!(e, PlaybackEvent::OnSessionEnded(_, r) if r.reason == PlaybackEndReason::Completed))
            .count();
        completions >= 4
    })
    .await;

    handle.stop().await;
    wait_until(|| handle.state() == playback_types::PlayerState::Stopped).await;
    assert!(handle.queue_snapshot().is_empty());

    handle.dispose().await;
}

#[tokio::test]
async fn s5_skip_then_enqueue_orders_cancellation_before_new_track() {
    init_logging();
    let log = Arc::new(EventLog::default());
    let source = Arc::new(FakeSource::new(vec![("t1", FakeTrack::Infinite)]));
    let sink = Arc::new(PacingSink::new(InMemoryWriter));
    let handle = PlaybackLoop::spawn(16, source, sink, vec![log.clone()]);

    handle.enqueue_tracks(vec![track("t1")]).await;
    wait_until(|| handle.state() == playback_types::PlayerState::Playing).await;

    handle.skip().await;
    handle.enqueue_tracks(vec![track("t2")]).await;

    wait_until(|| {
        log.snapshot()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::OnTrackChanged(Some(t)) if t.uri == "t2"))
    })
    .await;

    let events = log.snapshot();
    let cancelled_at = events
        .iter()
        .position(|e| matches!(e, PlaybackEvent::OnSessionEnded(t, r) if t.uri == "t1" && r.reason == PlaybackEndReason::Cancelled))
        .expect("t1 must be cancelled by skip");
    let t2_started_at = events
        .iter()
        .position(|e| matches!(e, PlaybackEvent::OnTrackChanged(Some(t)) if t.uri == "t2"))
        .unwrap();
    assert!(cancelled_at < t2_started_at);

    handle.dispose().await;
}

#[tokio::test]
async fn s6_pipeline_failure_advances_to_next_track_without_shutdown() {
    init_logging();
    let log = Arc::new(EventLog::default());
    let source = Arc::new(FakeSource::new(vec![
        ("t1", FakeTrack::Finite { bytes: 256, fail_with_code: Some(13) }),
        ("t2", FakeTrack::Finite { bytes: 256, fail_with_code: None }),
    ]));
    let sink = Arc::new(PacingSink::new(InMemoryWriter));
    let handle = PlaybackLoop::spawn(16, source, sink, vec![log.clone()]);

    handle.enqueue_tracks(vec![track("t1"), track("t2")]).await;

    wait_until(|| {
        log.snapshot()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::OnSessionEnded(_, r) if r.reason == PlaybackEndReason::Completed))
    })
    .await;

    let events = log.snapshot();
    let failed = events
        .iter()
        .find(|e| matches!(e, PlaybackEvent::OnSessionEnded(t, r) if t.uri == "t1" && r.reason == PlaybackEndReason::Failed))
        .expect("t1 must fail");
    if let PlaybackEvent::OnSessionEnded(_, result) = failed {
        let details = result.details.as_ref().expect("failure must carry details");
        assert!(details.contains("13"), "details must mention the exit code: {details}");
    }

    handle.dispose().await;
}
