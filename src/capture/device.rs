use crate::{
    analysis::{Analyser, AnalyserFrame},
    capture::FrameSource,
    config::{AnalyserConfig, CaptureConfig},
    error::DeviceError,
};

/*
Live Input
==========

A device hands back a stream once it is opened. The stream's own thread
(the audio callback) pushes samples into a lock-free ring; the tick drains
whatever arrived since the last tick:

    audio callback ──push──→ [ rtrb ring ] ──drain──→ RecordingSource
                                                        │
                                  all samples so far ←──┤
                                                        ▼
                                      analyser (last fft_size samples)

The source keeps every captured sample so the recording can be decoded
when it stops. Closing the stream drops the callback before returning.
*/

/// Something that can be opened for audio input.
pub trait InputDevice {
    fn open(&mut self, config: &CaptureConfig) -> Result<Box<dyn InputStream>, DeviceError>;
}

/// A running input stream, mono.
pub trait InputStream {
    fn sample_rate(&self) -> u32;

    /// Append every sample captured since the last call to `out`.
    fn read_into(&mut self, out: &mut Vec<f32>);

    /// Stop capturing. Nothing arrives after this returns.
    fn close(&mut self);
}

/// Analyses a live input stream while keeping the whole recording.
pub struct RecordingSource {
    stream: Box<dyn InputStream>,
    analyser: Analyser,
    captured: Vec<f32>,
}

impl std::fmt::Debug for RecordingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSource")
            .field("sample_rate", &self.stream.sample_rate())
            .field("captured", &self.captured.len())
            .finish_non_exhaustive()
    }
}

impl RecordingSource {
    pub fn new(stream: Box<dyn InputStream>, analyser: AnalyserConfig) -> Self {
        Self {
            stream,
            analyser: Analyser::new(analyser),
            captured: Vec::new(),
        }
    }

    pub fn captured(&self) -> &[f32] {
        &self.captured
    }

    /// Close the stream and hand back the recording.
    pub fn finish(mut self) -> (u32, Vec<f32>) {
        self.stream.read_into(&mut self.captured);
        self.stream.close();
        (self.stream.sample_rate(), self.captured)
    }

    /// Close the stream and throw the recording away.
    pub fn discard(mut self) {
        self.stream.close();
    }
}

impl FrameSource for RecordingSource {
    /// Never exhausted; a recording runs until stopped.
    fn next_frame(&mut self) -> Option<AnalyserFrame> {
        self.stream.read_into(&mut self.captured);
        Some(self.analyser.analyse(&self.captured))
    }

    fn sample_rate(&self) -> u32 {
        self.stream.sample_rate()
    }
}

#[cfg(feature = "device")]
pub use cpal_input::CpalInput;

#[cfg(feature = "device")]
mod cpal_input {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use rtrb::{Consumer, RingBuffer};

    use super::{InputDevice, InputStream};
    use crate::{config::CaptureConfig, error::DeviceError};

    /// Seconds of audio the ring holds between ticks.
    const RING_SECONDS: usize = 2;

    /// The host's default input device, through cpal.
    #[derive(Debug, Default)]
    pub struct CpalInput;

    impl CpalInput {
        pub fn new() -> Self {
            Self
        }
    }

    impl InputDevice for CpalInput {
        fn open(&mut self, config: &CaptureConfig) -> Result<Box<dyn InputStream>, DeviceError> {
            let host = cpal::default_host();
            let device = host.default_input_device().ok_or(DeviceError::NoInputDevice)?;

            let wanted = cpal::SampleRate(config.input_sample_rate);
            let supported = device
                .supported_input_configs()
                .map_err(|err| DeviceError::Backend(err.to_string()))?
                .find(|c| {
                    c.sample_format() == cpal::SampleFormat::F32
                        && c.min_sample_rate() <= wanted
                        && wanted <= c.max_sample_rate()
                })
                .map(|c| c.with_sample_rate(wanted));
            let supported = match supported {
                Some(supported) => supported,
                None => device
                    .default_input_config()
                    .map_err(|err| DeviceError::Backend(err.to_string()))?,
            };
            if supported.sample_format() != cpal::SampleFormat::F32 {
                return Err(DeviceError::Backend(format!(
                    "input sample format {} is not supported",
                    supported.sample_format()
                )));
            }

            let channels = supported.channels().max(1) as usize;
            let sample_rate = supported.sample_rate().0;
            log::debug!(
                "opening input device {:?}: {sample_rate} Hz, {channels} channels",
                device.name().unwrap_or_default()
            );

            let (mut producer, consumer) =
                RingBuffer::<f32>::new(sample_rate as usize * RING_SECONDS);
            let stream = device
                .build_input_stream(
                    &supported.into(),
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        for frame in data.chunks(channels) {
                            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
                            // A full ring drops samples rather than blocking the callback.
                            let _ = producer.push(mono);
                        }
                    },
                    |err| log::warn!("input stream error: {err}"),
                    None,
                )
                .map_err(|err| match err {
                    cpal::BuildStreamError::DeviceNotAvailable => DeviceError::Unavailable,
                    other => DeviceError::Backend(other.to_string()),
                })?;
            stream.play().map_err(|err| DeviceError::Backend(err.to_string()))?;

            Ok(Box::new(CpalStream {
                stream: Some(stream),
                consumer,
                sample_rate,
            }))
        }
    }

    struct CpalStream {
        stream: Option<cpal::Stream>,
        consumer: Consumer<f32>,
        sample_rate: u32,
    }

    impl InputStream for CpalStream {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn read_into(&mut self, out: &mut Vec<f32>) {
            while let Ok(sample) = self.consumer.pop() {
                out.push(sample);
            }
        }

        fn close(&mut self) {
            if let Some(stream) = self.stream.take() {
                if let Err(err) = stream.pause() {
                    log::warn!("failed to pause input stream: {err}");
                }
                drop(stream);
                log::debug!("input stream closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    struct Shared {
        pending: Vec<f32>,
        closed: bool,
    }

    struct TestStream(Rc<RefCell<Shared>>);

    impl InputStream for TestStream {
        fn sample_rate(&self) -> u32 {
            8_000
        }

        fn read_into(&mut self, out: &mut Vec<f32>) {
            out.append(&mut self.0.borrow_mut().pending);
        }

        fn close(&mut self) {
            self.0.borrow_mut().closed = true;
        }
    }

    #[test]
    fn recording_keeps_everything_captured() {
        let shared = Rc::new(RefCell::new(Shared {
            pending: vec![0.1; 100],
            closed: false,
        }));
        let stream = Box::new(TestStream(Rc::clone(&shared)));
        let mut source = RecordingSource::new(stream, AnalyserConfig::default());

        assert!(source.next_frame().is_some());
        shared.borrow_mut().pending.extend([0.2; 50]);
        assert!(source.next_frame().is_some());
        assert_eq!(source.captured().len(), 150);

        shared.borrow_mut().pending.extend([0.3; 10]);
        let (sample_rate, samples) = source.finish();
        assert_eq!(sample_rate, 8_000);
        assert_eq!(samples.len(), 160);
        assert!(shared.borrow().closed);
    }
}
