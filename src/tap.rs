use crate::{
    controller::{ControllerOutput, GestureController},
    platform::Platform,
    types::TouchFrame,
    voice::VoiceCommandResolver,
};

/// Whatever sits under the root input surface and normally owns the touches.
pub trait TouchSink {
    fn deliver(&mut self, now_ms: u64, frame: &TouchFrame);
}

impl<F> TouchSink for F
where
    F: FnMut(u64, &TouchFrame),
{
    fn deliver(&mut self, now_ms: u64, frame: &TouchFrame) {
        self(now_ms, frame)
    }
}

/// Listens on the root input stream without claiming it. Every frame goes to
/// the controller and then, unchanged, to the content sink, whatever the
/// controller decided.
pub struct PassiveTap<S> {
    sink: S,
}

impl<S: TouchSink> PassiveTap<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn dispatch<P, R>(
        &mut self,
        controller: &mut GestureController<P, R>,
        now_ms: u64,
        frame: &TouchFrame,
    ) -> ControllerOutput
    where
        P: Platform,
        R: VoiceCommandResolver,
    {
        let output = controller.on_touch(now_ms, frame);
        self.sink.deliver(now_ms, frame);
        output
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
