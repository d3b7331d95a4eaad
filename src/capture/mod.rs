//! The session controller: one audio source at a time, analysed on a
//! periodic tick.

use std::{fmt, sync::Arc};

use log::{debug, info, warn};

use crate::{
    analysis::{
        aggregate, detect_with, mean_amplitude, AnalysisFrame, AnalysisHistory, AnalysisReport,
        HistorySnapshot, PianoRollEntry,
    },
    config::EngineConfig,
    error::{DecodeError, Error, StateError},
    io::AudioBuffer,
    presets::{PresetRegistry, RenderRequest},
    render::{CompletedRender, RenderSlot},
};

mod device;
mod events;
mod source;

pub use device::{InputDevice, InputStream, RecordingSource};
#[cfg(feature = "device")]
pub use device::CpalInput;
pub use events::{CoreEvent, Observer, SubscriptionId};
pub use source::{BufferPlayback, FrameSource, ScriptedSource};

use events::Observers;

/*
Capture Sessions
================

                    start_recording
         ┌──────────────────────────────────────┐
         │                                      ▼
      ┌──────┐   stop (decodes recording)  ┌───────────┐
      │ Idle │ ◀────────────────────────── │ Recording │
      └──────┘                             └───────────┘
        │  ▲                                    │
        │  │ stop / source exhausted            │ play_and_analyze
        │  │ (report)                           ▼
        │  └──────────────────────────  ┌─────────────────────┐
        └──────────────────────────────▶│ PlayingAndAnalyzing │
                 play_and_analyze       └─────────────────────┘

Only one source exists at a time. Every transition that starts a source
drops the previous one first, and a recording's input stream is closed
before the call returns.

The host calls `tick` at `tick_rate_hz`. Each tick pulls one frame from
the source and sends `Redraw`; every `analysis_throttle` ticks the frame is
also run through pitch detection, recorded in the history and sent as a
`Frame` event. During playback the analysed frames are kept, and when the
session ends they are aggregated into the report.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureState {
    Idle,
    Recording,
    PlayingAndAnalyzing,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaptureState::Idle => "idle",
            CaptureState::Recording => "recording",
            CaptureState::PlayingAndAnalyzing => "playing and analyzing",
        })
    }
}

/// What one call to [`CaptureController::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session running.
    Idle,
    /// A frame was pulled but not analysed (throttled).
    Skipped,
    Analysed(AnalysisFrame),
    /// The playback source ran out. Carries the report if any frame was
    /// analysed.
    Finished(Option<Arc<AnalysisReport>>),
}

/// How a session ended on [`CaptureController::stop`].
#[derive(Debug, Clone)]
pub enum StopOutcome {
    Analysed(Option<Arc<AnalysisReport>>),
    Recorded(Arc<AudioBuffer>),
}

struct Playback {
    source: Box<dyn FrameSource>,
    waveform: Arc<AudioBuffer>,
    frames: Vec<AnalysisFrame>,
}

enum Session {
    Idle,
    Recording(RecordingSource),
    Playing(Playback),
}

impl Session {
    fn state(&self) -> CaptureState {
        match self {
            Session::Idle => CaptureState::Idle,
            Session::Recording(_) => CaptureState::Recording,
            Session::Playing(_) => CaptureState::PlayingAndAnalyzing,
        }
    }

    fn source(&mut self) -> Option<&mut dyn FrameSource> {
        match self {
            Session::Idle => None,
            Session::Recording(source) => Some(source as &mut dyn FrameSource),
            Session::Playing(playback) => Some(playback.source.as_mut() as &mut dyn FrameSource),
        }
    }
}

pub struct CaptureController {
    config: EngineConfig,
    session: Session,
    history: AnalysisHistory,
    ticks: u64,
    last_frame: Option<AnalysisFrame>,
    report: Option<Arc<AnalysisReport>>,
    recording: Option<Arc<AudioBuffer>>,
    observers: Observers,
    renders: RenderSlot,
}

impl fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureController")
            .field("state", &self.state())
            .field("ticks", &self.ticks)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl CaptureController {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            history: AnalysisHistory::new(&config.history),
            config,
            session: Session::Idle,
            ticks: 0,
            last_frame: None,
            report: None,
            recording: None,
            observers: Observers::default(),
            renders: RenderSlot::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.session.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &AnalysisHistory {
        &self.history
    }

    /// Live history while a session has data, otherwise the last session's.
    pub fn history_view(&self) -> HistorySnapshot {
        self.history.view()
    }

    /// The most recent analysed frame.
    pub fn last_frame(&self) -> Option<&AnalysisFrame> {
        self.last_frame.as_ref()
    }

    pub fn report(&self) -> Option<&Arc<AnalysisReport>> {
        self.report.as_ref()
    }

    /// The last recording decoded by `stop`.
    pub fn recording(&self) -> Option<&Arc<AudioBuffer>> {
        self.recording.as_ref()
    }

    pub fn latest_render(&self) -> Option<&CompletedRender> {
        self.renders.latest()
    }

    pub fn subscribe<O: Observer + 'static>(&mut self, observer: O) -> SubscriptionId {
        self.observers.add(Box::new(observer))
    }

    /// Returns false if `id` wasn't subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    /// Open `device` and start recording from it.
    ///
    /// The device is opened before anything else changes, so a failure
    /// leaves the controller as it was.
    pub fn start_recording(&mut self, device: &mut dyn InputDevice) -> Result<(), Error> {
        if self.state() == CaptureState::Recording {
            return Err(self.state_error("start recording"));
        }
        let stream = device.open(&self.config.capture).map_err(|err| {
            warn!("failed to open input device: {err}");
            err
        })?;

        // Any playback ends without a report.
        self.end_session();
        self.reset_session_data();
        self.recording = None;

        let source = RecordingSource::new(stream, self.config.analyser.clone());
        self.enter(Session::Recording(source));
        Ok(())
    }

    /// Play `buffer` through the built-in analyser.
    pub fn play_and_analyze(&mut self, buffer: Arc<AudioBuffer>) -> Result<(), Error> {
        if buffer.is_empty() {
            return Err(DecodeError::Empty.into());
        }
        let source =
            source::playback(&buffer, &self.config.analyser, self.config.capture.tick_rate_hz);
        self.start_playback(buffer, source);
        Ok(())
    }

    /// Play with frames from `source`. `buffer` is the waveform the report's
    /// levels are measured on.
    pub fn play_with_source<S: FrameSource + 'static>(
        &mut self,
        buffer: Arc<AudioBuffer>,
        source: S,
    ) -> Result<(), Error> {
        if buffer.is_empty() {
            return Err(DecodeError::Empty.into());
        }
        self.start_playback(buffer, Box::new(source));
        Ok(())
    }

    fn start_playback(&mut self, waveform: Arc<AudioBuffer>, source: Box<dyn FrameSource>) {
        self.end_session();
        self.reset_session_data();
        self.report = None;
        info!(
            "analysing {:.2} s of audio at {} Hz",
            waveform.duration(),
            waveform.sample_rate()
        );
        self.enter(Session::Playing(Playback {
            source,
            waveform,
            frames: Vec::new(),
        }));
    }

    /// Advance the running session by one tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.poll_renders();

        let Some(source) = self.session.source() else {
            return TickOutcome::Idle;
        };
        let sample_rate = source.sample_rate();
        let Some(frame) = source.next_frame() else {
            return TickOutcome::Finished(self.finish_playback());
        };

        let index = self.ticks;
        self.ticks += 1;
        let timestamp = index as f64 / self.config.capture.tick_rate_hz.max(f32::EPSILON) as f64;
        self.observers.emit(&CoreEvent::Redraw { timestamp });

        if index % u64::from(self.config.capture.analysis_throttle.max(1)) != 0 {
            return TickOutcome::Skipped;
        }

        let analysis = detect_with(&frame.spectrum, sample_rate as f32, &self.config.analyser);
        self.history.record(
            frame.spectrum.clone(),
            PianoRollEntry {
                timestamp,
                frequency: analysis.fundamental,
                amplitude: mean_amplitude(&frame.time_domain),
            },
        );
        if let Session::Playing(playback) = &mut self.session {
            playback.frames.push(analysis.clone());
        }
        self.last_frame = Some(analysis.clone());
        self.observers.emit(&CoreEvent::Frame {
            timestamp,
            spectrum: frame.spectrum,
            analysis: analysis.clone(),
        });
        TickOutcome::Analysed(analysis)
    }

    /// End the running session.
    ///
    /// Playback ends with a report. A recording is decoded; the device is
    /// released even when decoding fails.
    pub fn stop(&mut self) -> Result<StopOutcome, Error> {
        match self.state() {
            CaptureState::Idle => Err(self.state_error("stop")),
            CaptureState::PlayingAndAnalyzing => Ok(StopOutcome::Analysed(self.finish_playback())),
            CaptureState::Recording => {
                let Session::Recording(source) =
                    std::mem::replace(&mut self.session, Session::Idle)
                else {
                    return Err(self.state_error("stop"));
                };
                let (sample_rate, samples) = source.finish();
                self.history.persist();
                self.history.reset();
                self.announce(CaptureState::Recording, CaptureState::Idle);

                let buffer = AudioBuffer::from_mono(sample_rate, samples).map_err(|err| {
                    warn!("recording could not be decoded: {err}");
                    err
                })?;
                info!("recorded {:.2} s at {sample_rate} Hz", buffer.duration());
                let buffer = Arc::new(buffer);
                self.recording = Some(Arc::clone(&buffer));
                Ok(StopOutcome::Recorded(buffer))
            }
        }
    }

    /// Stop recording and play the recording back for analysis.
    pub fn stop_recording_and_analyze(&mut self) -> Result<Arc<AudioBuffer>, Error> {
        if self.state() != CaptureState::Recording {
            return Err(self.state_error("stop recording"));
        }
        match self.stop()? {
            StopOutcome::Recorded(buffer) => {
                self.play_and_analyze(Arc::clone(&buffer))?;
                Ok(buffer)
            }
            StopOutcome::Analysed(_) => Err(self.state_error("stop recording")),
        }
    }

    /// Forget the report, the live results and all history.
    pub fn clear_report(&mut self) {
        debug!("clearing report and history");
        self.report = None;
        self.last_frame = None;
        self.history.clear_all();
    }

    /// Start rendering a preset in the background. The result arrives as a
    /// `Rendered` or `RenderFailed` event from a later tick or poll.
    pub fn request_render(
        &mut self,
        registry: &Arc<PresetRegistry>,
        id: &str,
        duration: Option<f64>,
        seed: Option<u64>,
    ) -> Result<u64, Error> {
        registry.get(id)?;
        let request = RenderRequest {
            duration,
            sample_rate: None,
            seed,
        };
        Ok(self.renders.submit(registry.spawn_render(id, request)))
    }

    /// Publish renders that have finished since the last poll.
    pub fn poll_renders(&mut self) -> Vec<CompletedRender> {
        let completed = self.renders.poll();
        self.publish_renders(&completed);
        completed
    }

    /// Block until every requested render is done, then publish them.
    pub fn wait_for_renders(&mut self) -> Vec<CompletedRender> {
        let completed = self.renders.wait_all();
        self.publish_renders(&completed);
        completed
    }

    pub fn pending_renders(&self) -> usize {
        self.renders.pending()
    }

    fn publish_renders(&mut self, completed: &[CompletedRender]) {
        for render in completed {
            let event = match &render.result {
                Ok(buffer) => CoreEvent::Rendered {
                    preset_id: render.preset_id.clone(),
                    buffer: Arc::clone(buffer),
                },
                Err(err) => CoreEvent::RenderFailed(err.clone()),
            };
            self.observers.emit(&event);
        }
    }

    fn finish_playback(&mut self) -> Option<Arc<AnalysisReport>> {
        if !matches!(self.session, Session::Playing(_)) {
            return None;
        }
        let Session::Playing(playback) = std::mem::replace(&mut self.session, Session::Idle) else {
            return None;
        };
        self.history.persist();
        self.history.reset();
        self.announce(CaptureState::PlayingAndAnalyzing, CaptureState::Idle);

        if playback.frames.is_empty() {
            debug!("playback ended before any frame was analysed");
            return None;
        }
        let waveform = playback.waveform.channel(0).unwrap_or_default();
        let report = Arc::new(aggregate(&playback.frames, waveform));
        info!(
            "report: {} Hz ({}), loudness {}, peak {}",
            report.fundamental_freq, report.estimated_note, report.loudness, report.peak_amplitude
        );
        self.report = Some(Arc::clone(&report));
        self.observers.emit(&CoreEvent::Report(Arc::clone(&report)));
        Some(report)
    }

    /// Drop the running source without a report.
    fn end_session(&mut self) {
        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Idle => {}
            Session::Recording(source) => {
                debug!("discarding recording of {} samples", source.captured().len());
                source.discard();
                self.announce(CaptureState::Recording, CaptureState::Idle);
            }
            Session::Playing(_) => {
                debug!("stopping playback without a report");
                self.announce(CaptureState::PlayingAndAnalyzing, CaptureState::Idle);
            }
        }
    }

    fn reset_session_data(&mut self) {
        debug!("resetting history");
        self.history.clear_all();
        self.last_frame = None;
        self.ticks = 0;
    }

    fn enter(&mut self, session: Session) {
        let from = self.state();
        self.session = session;
        self.announce(from, self.state());
    }

    fn announce(&mut self, from: CaptureState, to: CaptureState) {
        if from != to {
            info!("capture: {from} -> {to}");
            self.observers.emit(&CoreEvent::StateChanged { from, to });
        }
    }

    fn state_error(&self, operation: &'static str) -> Error {
        StateError {
            operation,
            state: self.state(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{AnalyserFrame, SpectralFrame},
        error::DeviceError,
        io::AudioBuffer,
    };
    use std::{cell::RefCell, rc::Rc};

    fn tone_frame(bins: &[(usize, u8)]) -> AnalyserFrame {
        let mut bytes = vec![0u8; 1024];
        for &(bin, value) in bins {
            bytes[bin] = value;
        }
        AnalyserFrame {
            spectrum: SpectralFrame::new(bytes),
            time_domain: vec![0.1; 2048],
        }
    }

    fn buffer() -> Arc<AudioBuffer> {
        Arc::new(AudioBuffer::from_mono(44_100, vec![0.5; 4_410]).unwrap())
    }

    struct FailingDevice;

    impl InputDevice for FailingDevice {
        fn open(
            &mut self,
            _: &crate::config::CaptureConfig,
        ) -> Result<Box<dyn InputStream>, DeviceError> {
            Err(DeviceError::PermissionDenied("test".into()))
        }
    }

    struct SilentStream {
        closed: Rc<RefCell<bool>>,
        samples: usize,
    }

    impl InputStream for SilentStream {
        fn sample_rate(&self) -> u32 {
            8_000
        }

        fn read_into(&mut self, out: &mut Vec<f32>) {
            out.extend(std::iter::repeat(0.0).take(self.samples));
        }

        fn close(&mut self) {
            *self.closed.borrow_mut() = true;
        }
    }

    struct TestDevice {
        closed: Rc<RefCell<bool>>,
        samples: usize,
    }

    impl InputDevice for TestDevice {
        fn open(
            &mut self,
            _: &crate::config::CaptureConfig,
        ) -> Result<Box<dyn InputStream>, DeviceError> {
            Ok(Box::new(SilentStream {
                closed: Rc::clone(&self.closed),
                samples: self.samples,
            }))
        }
    }

    fn test_device(samples: usize) -> (TestDevice, Rc<RefCell<bool>>) {
        let closed = Rc::new(RefCell::new(false));
        (
            TestDevice {
                closed: Rc::clone(&closed),
                samples,
            },
            closed,
        )
    }

    #[test]
    fn stop_while_idle_is_a_state_error() {
        let mut controller = CaptureController::default();
        let err = controller.stop().unwrap_err();
        assert!(matches!(
            err,
            Error::State(StateError {
                state: CaptureState::Idle,
                ..
            })
        ));
        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(controller.tick(), TickOutcome::Idle);
    }

    #[test]
    fn device_failure_leaves_state_unchanged() {
        let mut controller = CaptureController::default();
        controller
            .play_with_source(buffer(), ScriptedSource::repeat(44_100, tone_frame(&[(20, 200)]), 5))
            .unwrap();
        let err = controller.start_recording(&mut FailingDevice).unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::PermissionDenied(_))));
        assert_eq!(controller.state(), CaptureState::PlayingAndAnalyzing);
    }

    #[test]
    fn device_failure_from_idle_stays_idle() {
        let mut controller = CaptureController::default();
        let err = controller.start_recording(&mut FailingDevice).unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::PermissionDenied(_))));
        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(controller.tick(), TickOutcome::Idle);
    }

    #[test]
    fn stop_moves_live_history_into_the_snapshot() {
        let mut controller = CaptureController::default();
        controller
            .play_with_source(
                buffer(),
                ScriptedSource::repeat(44_100, tone_frame(&[(20, 200)]), 50),
            )
            .unwrap();
        for _ in 0..5 {
            controller.tick();
        }
        assert_eq!(controller.history().spectrogram().len(), 5);

        controller.stop().unwrap();
        assert!(controller.history().spectrogram().is_empty());
        assert!(controller.history().piano_roll().is_empty());
        let view = controller.history_view();
        assert_eq!(view.spectrogram.len(), 5);
        assert_eq!(view.piano_roll.len(), 5);
    }

    #[test]
    fn stopping_a_recording_clears_live_history() {
        let (mut device, _) = test_device(400);
        let mut controller = CaptureController::default();
        controller.start_recording(&mut device).unwrap();
        controller.tick();
        controller.stop().unwrap();
        assert!(controller.history().piano_roll().is_empty());
        assert_eq!(controller.history_view().piano_roll.len(), 1);
    }

    #[test]
    fn playback_ends_with_a_report() {
        let mut controller = CaptureController::default();
        controller
            .play_with_source(buffer(), ScriptedSource::repeat(44_100, tone_frame(&[(20, 200)]), 3))
            .unwrap();

        for _ in 0..3 {
            assert!(matches!(controller.tick(), TickOutcome::Analysed(_)));
        }
        let TickOutcome::Finished(Some(report)) = controller.tick() else {
            panic!("expected a report");
        };
        assert_eq!(report.fundamental_freq, 431.0);
        assert_eq!(report.estimated_note, "A4");
        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(controller.history_view().spectrogram.len(), 3);
        assert!(controller.report().is_some());
    }

    #[test]
    fn throttle_skips_analysis_but_not_redraws() {
        let mut config = EngineConfig::default();
        config.capture.analysis_throttle = 3;
        let mut controller = CaptureController::new(config);

        let redraws = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&redraws);
        controller.subscribe(move |event: &CoreEvent| {
            if matches!(event, CoreEvent::Redraw { .. }) {
                *counter.borrow_mut() += 1;
            }
        });

        controller
            .play_with_source(buffer(), ScriptedSource::repeat(44_100, tone_frame(&[(20, 200)]), 7))
            .unwrap();
        let analysed = (0..7)
            .filter(|_| matches!(controller.tick(), TickOutcome::Analysed(_)))
            .count();
        assert_eq!(analysed, 3);
        assert_eq!(*redraws.borrow(), 7);
        assert_eq!(controller.history().piano_roll().len(), 3);
    }

    #[test]
    fn stopping_playback_early_still_reports() {
        let mut controller = CaptureController::default();
        controller
            .play_with_source(
                buffer(),
                ScriptedSource::repeat(44_100, tone_frame(&[(40, 220)]), 100),
            )
            .unwrap();
        controller.tick();
        let StopOutcome::Analysed(Some(report)) = controller.stop().unwrap() else {
            panic!("expected a report");
        };
        assert_eq!(report.fundamental_freq, 861.0);
        assert_eq!(controller.state(), CaptureState::Idle);
    }

    #[test]
    fn recording_round_trip() {
        let (mut device, closed) = test_device(400);
        let mut controller = CaptureController::default();
        controller.start_recording(&mut device).unwrap();
        assert_eq!(controller.state(), CaptureState::Recording);

        let err = controller.start_recording(&mut device).unwrap_err();
        assert!(matches!(err, Error::State(_)));

        controller.tick();
        controller.tick();
        let StopOutcome::Recorded(recording) = controller.stop().unwrap() else {
            panic!("expected a recording");
        };
        assert!(*closed.borrow());
        assert_eq!(recording.sample_rate(), 8_000);
        // Two ticks plus the final drain.
        assert_eq!(recording.len(), 1_200);
        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(controller.history_view().piano_roll.len(), 2);
    }

    #[test]
    fn empty_recording_fails_to_decode_but_releases_the_device() {
        let (mut device, closed) = test_device(0);
        let mut controller = CaptureController::default();
        controller.start_recording(&mut device).unwrap();
        let err = controller.stop().unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Empty)));
        assert!(*closed.borrow());
        assert_eq!(controller.state(), CaptureState::Idle);
    }

    #[test]
    fn playback_while_recording_closes_the_stream() {
        let (mut device, closed) = test_device(100);
        let mut controller = CaptureController::default();
        controller.start_recording(&mut device).unwrap();
        controller.play_and_analyze(buffer()).unwrap();
        assert!(*closed.borrow());
        assert_eq!(controller.state(), CaptureState::PlayingAndAnalyzing);
    }

    #[test]
    fn stop_recording_and_analyze_plays_the_recording() {
        let (mut device, _) = test_device(800);
        let mut controller = CaptureController::default();

        let err = controller.stop_recording_and_analyze().unwrap_err();
        assert!(matches!(err, Error::State(_)));

        controller.start_recording(&mut device).unwrap();
        controller.tick();
        let recording = controller.stop_recording_and_analyze().unwrap();
        assert_eq!(recording.len(), 1_600);
        assert_eq!(controller.state(), CaptureState::PlayingAndAnalyzing);

        while !matches!(controller.tick(), TickOutcome::Finished(_)) {}
        assert_eq!(controller.state(), CaptureState::Idle);
    }

    #[test]
    fn state_changes_are_announced() {
        let mut controller = CaptureController::default();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&changes);
        let id = controller.subscribe(move |event: &CoreEvent| {
            if let CoreEvent::StateChanged { from, to } = event {
                log.borrow_mut().push((*from, *to));
            }
        });

        controller
            .play_with_source(buffer(), ScriptedSource::repeat(44_100, tone_frame(&[(20, 200)]), 1))
            .unwrap();
        controller.tick();
        controller.tick();
        assert_eq!(
            *changes.borrow(),
            vec![
                (CaptureState::Idle, CaptureState::PlayingAndAnalyzing),
                (CaptureState::PlayingAndAnalyzing, CaptureState::Idle),
            ]
        );

        assert!(controller.unsubscribe(id));
        controller.play_and_analyze(buffer()).unwrap();
        assert_eq!(changes.borrow().len(), 2);
    }

    #[test]
    fn clear_report_drops_everything() {
        let mut controller = CaptureController::default();
        controller
            .play_with_source(buffer(), ScriptedSource::repeat(44_100, tone_frame(&[(20, 200)]), 2))
            .unwrap();
        while !matches!(controller.tick(), TickOutcome::Finished(_)) {}
        assert!(controller.report().is_some());

        controller.clear_report();
        assert!(controller.report().is_none());
        assert!(controller.last_frame().is_none());
        assert!(controller.history_view().is_empty());
    }

    #[test]
    fn unknown_preset_render_is_rejected_up_front() {
        let registry = Arc::new(PresetRegistry::builtin());
        let mut controller = CaptureController::default();
        let err = controller.request_render(&registry, "nope", None, None).unwrap_err();
        assert!(matches!(err, Error::UnknownPreset(id) if id == "nope"));
        assert_eq!(controller.pending_renders(), 0);
    }
}
