use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{
    error::{GraphError, SynthesisError},
    render::RenderedBuffer,
};

/*
Background Renders
==================

A long preset (15 s of rainforest through a 7 s reverb) takes a while, so a
host that must keep ticking spawns it:

    caller thread                 worker thread
    ─────────────                 ─────────────
    RenderTask::spawn ─────────→  compile + render
    slot.submit(task)                   │
    ... ticks ...                       │
    slot.poll() ──(not finished)        │
    ... ticks ...                       ▼
    slot.poll() ──────────────→  Ok(buffer) / Err(SynthesisError)

There is no cancellation. Two renders can be in flight at once; whichever
completes last owns the slot. When a poll finds several finished at once,
they are taken in submission order, so the newest request ends up on top.
A worker that panics is reported as an error, never re-raised.
*/

pub type RenderResult = Result<Arc<RenderedBuffer>, SynthesisError>;

/// A render running on its own thread.
pub struct RenderTask {
    preset_id: String,
    handle: JoinHandle<Result<RenderedBuffer, SynthesisError>>,
}

impl RenderTask {
    pub fn spawn<F>(preset_id: impl Into<String>, job: F) -> Self
    where
        F: FnOnce() -> Result<RenderedBuffer, SynthesisError> + Send + 'static,
    {
        let preset_id = preset_id.into();
        log::info!("spawning render of `{preset_id}`");
        Self {
            preset_id,
            handle: thread::spawn(job),
        }
    }

    pub fn preset_id(&self) -> &str {
        &self.preset_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the render to end.
    pub fn join(self) -> RenderResult {
        match self.handle.join() {
            Ok(result) => result.map(Arc::new),
            Err(_) => {
                log::warn!("render worker for `{}` panicked", self.preset_id);
                Err(SynthesisError::new(self.preset_id, GraphError::WorkerPanicked))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletedRender {
    pub preset_id: String,
    /// Submission number; higher was requested later.
    pub generation: u64,
    pub result: RenderResult,
}

/// Holds in-flight renders and the most recently completed one.
#[derive(Default)]
pub struct RenderSlot {
    pending: Vec<(u64, RenderTask)>,
    next_generation: u64,
    latest: Option<CompletedRender>,
}

impl RenderSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `task`; returns its generation.
    pub fn submit(&mut self, task: RenderTask) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.pending.push((generation, task));
        generation
    }

    /// Collect every finished render, oldest submission first. Each one
    /// replaces the slot's latest result.
    pub fn poll(&mut self) -> Vec<CompletedRender> {
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(_, task)| task.is_finished());
        self.pending = running;
        self.complete(finished)
    }

    /// Block until every pending render has finished.
    pub fn wait_all(&mut self) -> Vec<CompletedRender> {
        let finished = std::mem::take(&mut self.pending);
        self.complete(finished)
    }

    fn complete(&mut self, finished: Vec<(u64, RenderTask)>) -> Vec<CompletedRender> {
        let completed: Vec<CompletedRender> = finished
            .into_iter()
            .map(|(generation, task)| {
                let preset_id = task.preset_id().to_owned();
                let result = task.join();
                match &result {
                    Ok(buffer) => log::info!(
                        "render of `{preset_id}` finished: {:.2} s, {} channels",
                        buffer.duration(),
                        buffer.channel_count()
                    ),
                    Err(err) => log::warn!("{err}"),
                }
                CompletedRender {
                    preset_id,
                    generation,
                    result,
                }
            })
            .collect();

        if let Some(last) = completed.last() {
            self.latest = Some(last.clone());
        }
        completed
    }

    pub fn latest(&self) -> Option<&CompletedRender> {
        self.latest.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}
