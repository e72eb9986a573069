use crate::host::{BufferSpec, CloseResponder, Host, InputRequest, InputResponder, PickerItem, PickerResponder};
use crate::pipeline::Origin;
use crate::shared::{ViewId, WindowId};
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Every interaction the engine had with a [`HeadlessHost`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRecord {
    Panel {
        window: WindowId,
        name: String,
        contents: String,
    },
    Buffer {
        window: WindowId,
        view: ViewId,
        spec: BufferSpec,
        contents: String,
    },
    OpenedFile {
        window: WindowId,
        view: ViewId,
        path: PathBuf,
    },
    Inserted {
        window: WindowId,
        view: ViewId,
        text: String,
    },
    Picker {
        window: WindowId,
        items: Vec<PickerItem>,
    },
    Input {
        window: WindowId,
        caption: String,
        initial_text: String,
    },
    Confirm {
        message: String,
        answer: bool,
    },
    Error {
        message: String,
    },
    Status {
        key: String,
        text: String,
    },
}

/// Canned user answers, consumed front to back by pickers, prompts and
/// confirmations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Pick(usize),
    Dismiss,
    Text(String),
    Edit(String),
    Cancel,
    Confirm(bool),
}

#[derive(Debug, Default)]
struct HeadlessWindow {
    folders: Vec<PathBuf>,
}

#[derive(Debug)]
struct HeadlessView {
    window: WindowId,
    file_name: Option<PathBuf>,
    contents: String,
    on_close: Option<CloseResponder>,
}

/// In-memory host for tests and the command line. Interactive requests are
/// answered from the scripted replies; an unanswerable request drops its
/// responder, which abandons the waiting pipeline.
#[derive(Debug)]
pub struct HeadlessHost {
    windows: BTreeMap<WindowId, HeadlessWindow>,
    views: BTreeMap<ViewId, HeadlessView>,
    active: Origin,
    replies: VecDeque<ScriptedReply>,
    records: Vec<HostRecord>,
    auto_close_buffers: bool,
    last_view: u64,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        let window = WindowId::new(1);
        let mut windows = BTreeMap::new();
        windows.insert(window, HeadlessWindow::default());
        Self {
            windows,
            views: BTreeMap::new(),
            active: Origin::in_window(window),
            replies: VecDeque::new(),
            records: Vec::new(),
            auto_close_buffers: false,
            last_view: 0,
        }
    }

    pub fn with_window(mut self, window: WindowId, folders: Vec<PathBuf>) -> Self {
        self.windows.insert(window, HeadlessWindow { folders });
        self
    }

    /// Adds a view and makes it the active one.
    pub fn with_view(mut self, window: WindowId, view: ViewId, file_name: Option<PathBuf>) -> Self {
        self.windows.entry(window).or_default();
        let contents = file_name
            .as_deref()
            .and_then(|path| fs::read_to_string(path).ok())
            .unwrap_or_default();
        self.last_view = self.last_view.max(view.get());
        self.views.insert(
            view,
            HeadlessView {
                window,
                file_name,
                contents,
                on_close: None,
            },
        );
        self.active = Origin::in_view(window, view);
        self
    }

    pub fn with_replies<I>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = ScriptedReply>,
    {
        self.replies.extend(replies);
        self
    }

    pub fn auto_close_buffers(mut self, enabled: bool) -> Self {
        self.auto_close_buffers = enabled;
        self
    }

    pub fn push_reply(&mut self, reply: ScriptedReply) {
        self.replies.push_back(reply);
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    pub fn records(&self) -> &[HostRecord] {
        &self.records
    }

    pub fn panels(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|record| match record {
                HostRecord::Panel { contents, .. } => Some(contents.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|record| match record {
                HostRecord::Error { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|record| match record {
                HostRecord::Status { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn view_contents(&self, view: ViewId) -> Option<&str> {
        self.views.get(&view).map(|entry| entry.contents.as_str())
    }

    pub fn open_views(&self) -> Vec<ViewId> {
        self.views.keys().copied().collect()
    }

    /// Closes a view, optionally replacing its text first, and fires its
    /// close hook.
    pub fn close_view(&mut self, view: ViewId, contents: Option<String>) -> bool {
        let Some(mut entry) = self.views.remove(&view) else {
            return false;
        };
        if let Some(contents) = contents {
            entry.contents = contents;
        }
        if let Some(responder) = entry.on_close.take() {
            responder.closed(&entry.contents);
        }
        if self.active.view == Some(view) {
            self.active.view = None;
        }
        true
    }

    /// Closes a window without firing close hooks for its views.
    pub fn close_window(&mut self, window: WindowId) {
        self.windows.remove(&window);
        self.views.retain(|_, entry| entry.window != window);
        if self.active.window == Some(window) {
            self.active = Origin::global();
        }
    }

    pub fn transcript(&self) -> Vec<String> {
        self.records.iter().map(describe).collect()
    }

    fn allocate_view(&mut self) -> ViewId {
        self.last_view += 1;
        ViewId::new(self.last_view)
    }

    fn attach_view(
        &mut self,
        window: WindowId,
        file_name: Option<PathBuf>,
        contents: String,
        on_close: Option<CloseResponder>,
    ) -> ViewId {
        let view = self.allocate_view();
        if self.auto_close_buffers {
            if let Some(responder) = on_close {
                responder.closed(&contents);
            }
            return view;
        }
        self.views.insert(
            view,
            HeadlessView {
                window,
                file_name,
                contents,
                on_close,
            },
        );
        view
    }
}

fn describe(record: &HostRecord) -> String {
    match record {
        HostRecord::Panel { name, contents, .. } => format!("panel[{name}]:\n{contents}"),
        HostRecord::Buffer { view, spec, contents, .. } => format!(
            "buffer[{}] {view}:\n{contents}",
            spec.name.as_deref().unwrap_or("untitled")
        ),
        HostRecord::OpenedFile { view, path, .. } => {
            format!("open[{}] {view}", path.display())
        }
        HostRecord::Inserted { view, text, .. } => format!("insert[{view}]:\n{text}"),
        HostRecord::Picker { items, .. } => {
            let titles: Vec<&str> = items.iter().map(PickerItem::title).collect();
            format!("picker: {}", titles.join(" | "))
        }
        HostRecord::Input { caption, .. } => format!("prompt: {caption}"),
        HostRecord::Confirm { message, answer } => format!("confirm: {message} -> {answer}"),
        HostRecord::Error { message } => format!("error: {message}"),
        HostRecord::Status { key, text } => format!("status[{key}]: {text}"),
    }
}

impl Host for HeadlessHost {
    fn active_origin(&self) -> Origin {
        self.active
    }

    fn window_exists(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    fn view_exists(&self, window: WindowId, view: ViewId) -> bool {
        self.views
            .get(&view)
            .map(|entry| entry.window == window)
            .unwrap_or(false)
    }

    fn view_file_name(&self, window: WindowId, view: ViewId) -> Option<PathBuf> {
        self.views
            .get(&view)
            .filter(|entry| entry.window == window)
            .and_then(|entry| entry.file_name.clone())
    }

    fn window_folders(&self, window: WindowId) -> Vec<PathBuf> {
        self.windows
            .get(&window)
            .map(|entry| entry.folders.clone())
            .unwrap_or_default()
    }

    fn show_panel(&mut self, window: WindowId, name: &str, contents: &str) {
        self.records.push(HostRecord::Panel {
            window,
            name: name.to_string(),
            contents: contents.to_string(),
        });
    }

    fn new_buffer(
        &mut self,
        window: WindowId,
        spec: BufferSpec,
        contents: &str,
        on_close: Option<CloseResponder>,
    ) -> Option<ViewId> {
        let view = self.attach_view(window, None, contents.to_string(), on_close);
        self.records.push(HostRecord::Buffer {
            window,
            view,
            spec,
            contents: contents.to_string(),
        });
        Some(view)
    }

    fn open_file(
        &mut self,
        window: WindowId,
        path: &Path,
        on_close: Option<CloseResponder>,
    ) -> Option<ViewId> {
        let contents = fs::read_to_string(path).unwrap_or_default();
        let view = self.attach_view(window, Some(path.to_path_buf()), contents, on_close);
        self.records.push(HostRecord::OpenedFile {
            window,
            view,
            path: path.to_path_buf(),
        });
        Some(view)
    }

    fn insert_text(&mut self, window: WindowId, view: ViewId, text: &str) {
        if let Some(entry) = self.views.get_mut(&view) {
            entry.contents.insert_str(0, text);
        }
        self.records.push(HostRecord::Inserted {
            window,
            view,
            text: text.to_string(),
        });
    }

    fn show_picker(&mut self, window: WindowId, items: Vec<PickerItem>, responder: PickerResponder) {
        let count = items.len();
        self.records.push(HostRecord::Picker { window, items });
        match self.replies.pop_front() {
            Some(ScriptedReply::Pick(index)) if index < count => {
                responder.highlighted(index);
                responder.select(index);
            }
            Some(ScriptedReply::Pick(_)) | Some(ScriptedReply::Dismiss) => responder.dismiss(),
            Some(other) => self.replies.push_front(other),
            None => {}
        }
    }

    fn show_input(&mut self, window: WindowId, request: InputRequest, responder: InputResponder) {
        self.records.push(HostRecord::Input {
            window,
            caption: request.caption,
            initial_text: request.initial_text,
        });
        loop {
            match self.replies.pop_front() {
                Some(ScriptedReply::Edit(text)) => responder.changed(&text),
                Some(ScriptedReply::Text(text)) => return responder.submit(&text),
                Some(ScriptedReply::Cancel) => return responder.cancel(),
                Some(other) => {
                    self.replies.push_front(other);
                    return;
                }
                None => return,
            }
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        let answer = match self.replies.front() {
            Some(ScriptedReply::Confirm(answer)) => {
                let answer = *answer;
                self.replies.pop_front();
                answer
            }
            _ => false,
        };
        self.records.push(HostRecord::Confirm {
            message: message.to_string(),
            answer,
        });
        answer
    }

    fn error_message(&mut self, message: &str) {
        self.records.push(HostRecord::Error {
            message: message.to_string(),
        });
    }

    fn status_message(&mut self, key: &str, text: &str) {
        self.records.push(HostRecord::Status {
            key: key.to_string(),
            text: text.to_string(),
        });
    }
}
