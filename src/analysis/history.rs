use crate::{analysis::SpectralFrame, config::HistoryConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
History Rings
=============

Two rings are filled side by side, one entry each per analysed tick:

  spectrogram   ┌────┬────┬────┬────┐    frames of spectrum bytes
                │ f3 │ f4 │ f1 │ f2 │
                └────┴────┴────┴────┘
                       ▲ head (oldest)
  piano roll    ┌────┬────┬────┬────┐    (timestamp, pitch, amplitude)
                │ e3 │ e4 │ e1 │ e2 │
                └────┴────┴────┴────┘

Slots are allocated once. Until the ring is full, pushes append; after
that each push overwrites the slot under `head` and moves `head` on, so
reading from `head` round to `head - 1` gives oldest to newest.

When a session stops, a copy of both rings is persisted so the last
picture stays available after the live rings are reset for the next one.
*/

/// Fixed-capacity FIFO that overwrites its oldest item when full.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    head: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.slots.len() < self.capacity {
            self.slots.push(item);
        } else {
            self.slots[self.head] = item;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer)
    }

    pub fn latest(&self) -> Option<&T> {
        self.iter().next_back()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy of the contents, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

/// One analysed tick on the piano roll.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PianoRollEntry {
    /// Seconds since the session started.
    pub timestamp: f64,
    /// Detected fundamental, 0 for none.
    pub frequency: f32,
    /// Mean absolute sample value of the tick's time-domain frame.
    pub amplitude: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySnapshot {
    pub spectrogram: Vec<SpectralFrame>,
    pub piano_roll: Vec<PianoRollEntry>,
}

impl HistorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.spectrogram.is_empty() && self.piano_roll.is_empty()
    }
}

/// Live spectrogram and piano-roll rings plus the snapshot persisted at
/// the end of the last session.
#[derive(Debug, Clone)]
pub struct AnalysisHistory {
    spectrogram: RingBuffer<SpectralFrame>,
    piano_roll: RingBuffer<PianoRollEntry>,
    persisted: Option<HistorySnapshot>,
}

impl AnalysisHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            spectrogram: RingBuffer::new(config.spectrogram_frames),
            piano_roll: RingBuffer::new(config.piano_roll_entries),
            persisted: None,
        }
    }

    /// Record one tick in both rings.
    pub fn record(&mut self, frame: SpectralFrame, entry: PianoRollEntry) {
        self.spectrogram.push(frame);
        self.piano_roll.push(entry);
    }

    pub fn spectrogram(&self) -> &RingBuffer<SpectralFrame> {
        &self.spectrogram
    }

    pub fn piano_roll(&self) -> &RingBuffer<PianoRollEntry> {
        &self.piano_roll
    }

    fn live(&self) -> HistorySnapshot {
        HistorySnapshot {
            spectrogram: self.spectrogram.to_vec(),
            piano_roll: self.piano_roll.to_vec(),
        }
    }

    /// Keep a copy of the live rings.
    pub fn persist(&mut self) {
        self.persisted = Some(self.live());
    }

    pub fn persisted(&self) -> Option<&HistorySnapshot> {
        self.persisted.as_ref()
    }

    /// Empty the live rings. The persisted copy stays.
    pub fn reset(&mut self) {
        self.spectrogram.clear();
        self.piano_roll.clear();
    }

    /// Empty the live rings and drop the persisted copy.
    pub fn clear_all(&mut self) {
        self.reset();
        self.persisted = None;
    }

    /// Live data while there is any, otherwise the persisted copy.
    pub fn view(&self) -> HistorySnapshot {
        if self.spectrogram.is_empty() && self.piano_roll.is_empty() {
            self.persisted.clone().unwrap_or_default()
        } else {
            self.live()
        }
    }
}

/// Mean of `|sample|`; 0 for no samples.
pub fn mean_amplitude(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.abs()).sum::<f32>() / samples.len() as f32
}
