pub mod headless;
pub mod responders;

pub use headless::{HeadlessHost, HostRecord, ScriptedReply};
pub use responders::{CloseResponder, InputResponder, PickerResponder};

use crate::pipeline::Origin;
use crate::shared::{ViewId, WindowId};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BufferSpec {
    pub name: Option<String>,
    pub scratch: bool,
    pub readonly: bool,
    pub syntax: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerItem {
    Single(String),
    Pair { title: String, detail: String },
}

impl PickerItem {
    pub fn title(&self) -> &str {
        match self {
            PickerItem::Single(title) | PickerItem::Pair { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputRequest {
    pub caption: String,
    pub initial_text: String,
}

/// The editor surface the engine drives. Every call happens on the engine's
/// thread. Interactive calls hand over a responder; the host answers through
/// it whenever the user acts, or drops it to abandon the pipeline.
pub trait Host {
    fn active_origin(&self) -> Origin;

    fn window_exists(&self, window: WindowId) -> bool;

    fn view_exists(&self, window: WindowId, view: ViewId) -> bool;

    fn view_file_name(&self, window: WindowId, view: ViewId) -> Option<PathBuf>;

    fn window_folders(&self, window: WindowId) -> Vec<PathBuf>;

    fn show_panel(&mut self, window: WindowId, name: &str, contents: &str);

    fn new_buffer(
        &mut self,
        window: WindowId,
        spec: BufferSpec,
        contents: &str,
        on_close: Option<CloseResponder>,
    ) -> Option<ViewId>;

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn open_file(
        &mut self,
        window: WindowId,
        path: &Path,
        on_close: Option<CloseResponder>,
    ) -> Option<ViewId>;

    /// Writes `text` at the top of the view and leaves the cursor on line 1.
    fn insert_text(&mut self, window: WindowId, view: ViewId, text: &str);

    fn show_picker(&mut self, window: WindowId, items: Vec<PickerItem>, responder: PickerResponder);

    fn show_input(&mut self, window: WindowId, request: InputRequest, responder: InputResponder);

    fn confirm(&mut self, message: &str) -> bool;

    fn error_message(&mut self, message: &str);

    /// Empty `text` clears the message stored under `key`.
    fn status_message(&mut self, key: &str, text: &str);
}
