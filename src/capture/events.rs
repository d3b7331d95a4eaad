use std::sync::Arc;

use crate::{
    analysis::{AnalysisFrame, AnalysisReport, SpectralFrame},
    capture::CaptureState,
    error::SynthesisError,
    render::RenderedBuffer,
};

/// Everything the controller tells its subscribers about.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    StateChanged {
        from: CaptureState,
        to: CaptureState,
    },
    /// An analysed tick.
    Frame {
        timestamp: f64,
        spectrum: SpectralFrame,
        analysis: AnalysisFrame,
    },
    /// Sent every tick, analysed or not, so a display can repaint.
    Redraw { timestamp: f64 },
    Report(Arc<AnalysisReport>),
    Rendered {
        preset_id: String,
        buffer: Arc<RenderedBuffer>,
    },
    RenderFailed(SynthesisError),
}

/// Receives [`CoreEvent`]s. Any `FnMut(&CoreEvent)` is an observer.
pub trait Observer {
    fn notify(&mut self, event: &CoreEvent);
}

impl<F: FnMut(&CoreEvent)> Observer for F {
    fn notify(&mut self, event: &CoreEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn Observer>)>,
}

impl Observers {
    pub fn add(&mut self, observer: Box<dyn Observer>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// In subscription order.
    pub fn emit(&mut self, event: &CoreEvent) {
        for (_, observer) in &mut self.entries {
            observer.notify(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
