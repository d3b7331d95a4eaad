use crate::graph::{
    amplify::Amplify,
    modulate::Modulate,
    node::{GraphNode, Modulatable, StereoNode},
    pan::Panner,
    schedule::Scheduled,
    through::Through,
};

pub trait NodeExt: GraphNode + Sized {
    fn amplify<M: GraphNode>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn through<F: GraphNode>(self, filter: F) -> Through<Self, F> {
        Through::new(self, filter)
    }

    fn modulate<M: GraphNode>(self, lfo: M, param: Self::Param, depth: f32) -> Modulate<Self, M>
    where
        Self: Modulatable,
    {
        Modulate::new(self, lfo, param, depth)
    }

    /// Play only between `start` and `stop` seconds.
    fn between(self, start: f64, stop: f64) -> Scheduled<Self> {
        Scheduled::new(self, start, stop)
    }

    /// Place in the stereo field (-1 left, +1 right).
    fn pan(self, position: f32) -> Panner<Self> {
        Panner::new(self, position)
    }
}

impl<T: GraphNode> NodeExt for T {}

/// The combinators that also make sense after a signal has gone stereo.
pub trait StereoExt: StereoNode + Sized {
    fn amplify<M: GraphNode>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn modulate<M: GraphNode>(self, lfo: M, param: Self::Param, depth: f32) -> Modulate<Self, M>
    where
        Self: Modulatable,
    {
        Modulate::new(self, lfo, param, depth)
    }

    fn between(self, start: f64, stop: f64) -> Scheduled<Self> {
        Scheduled::new(self, start, stop)
    }
}

impl<T: StereoNode> StereoExt for T {}
