use crate::runtime::UiEvent;
use crate::shared::ContinuationId;
use std::sync::mpsc::Sender;

/// One-shot link back to a parked continuation. Whatever is not answered is
/// released on drop so the engine can discard the waiting context.
#[derive(Debug)]
struct Link {
    continuation: ContinuationId,
    events: Option<Sender<UiEvent>>,
}

impl Link {
    fn new(continuation: ContinuationId, events: Sender<UiEvent>) -> Self {
        Self {
            continuation,
            events: Some(events),
        }
    }

    fn notify(&self, event: UiEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn finish(&mut self, event: UiEvent) {
        if let Some(events) = self.events.take() {
            let _ = events.send(event);
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        let continuation = self.continuation;
        self.finish(UiEvent::Released { continuation });
    }
}

#[derive(Debug)]
pub struct PickerResponder {
    link: Link,
}

impl PickerResponder {
    pub(crate) fn new(continuation: ContinuationId, events: Sender<UiEvent>) -> Self {
        Self {
            link: Link::new(continuation, events),
        }
    }

    pub fn continuation(&self) -> ContinuationId {
        self.link.continuation
    }

    pub fn highlighted(&self, index: usize) {
        self.link.notify(UiEvent::PickerHighlighted {
            continuation: self.link.continuation,
            index,
        });
    }

    pub fn select(mut self, index: usize) {
        let continuation = self.link.continuation;
        self.link.finish(UiEvent::PickerDone {
            continuation,
            index: Some(index),
        });
    }

    pub fn dismiss(mut self) {
        let continuation = self.link.continuation;
        self.link.finish(UiEvent::PickerDone {
            continuation,
            index: None,
        });
    }
}

#[derive(Debug)]
pub struct InputResponder {
    link: Link,
}

impl InputResponder {
    pub(crate) fn new(continuation: ContinuationId, events: Sender<UiEvent>) -> Self {
        Self {
            link: Link::new(continuation, events),
        }
    }

    pub fn continuation(&self) -> ContinuationId {
        self.link.continuation
    }

    pub fn changed(&self, text: &str) {
        self.link.notify(UiEvent::InputChanged {
            continuation: self.link.continuation,
            text: text.to_string(),
        });
    }

    pub fn submit(mut self, text: &str) {
        let continuation = self.link.continuation;
        self.link.finish(UiEvent::InputDone {
            continuation,
            text: text.to_string(),
        });
    }

    pub fn cancel(mut self) {
        let continuation = self.link.continuation;
        self.link.finish(UiEvent::InputCancelled { continuation });
    }
}

#[derive(Debug)]
pub struct CloseResponder {
    link: Link,
}

impl CloseResponder {
    pub(crate) fn new(continuation: ContinuationId, events: Sender<UiEvent>) -> Self {
        Self {
            link: Link::new(continuation, events),
        }
    }

    pub fn continuation(&self) -> ContinuationId {
        self.link.continuation
    }

    pub fn closed(mut self, contents: &str) {
        let continuation = self.link.continuation;
        self.link.finish(UiEvent::BufferClosed {
            continuation,
            contents: contents.to_string(),
        });
    }
}
