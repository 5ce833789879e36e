use crate::api::ChatClient;
use crate::errors::{ConfidanteError, ConfidanteResult};
use crate::models::{Message, MessageKind};
use crate::notification::{Notification, Severity};
use crate::status_indicator::StatusIndicator;
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Display budget for the character counter. Not enforced as a hard limit;
/// the server rejects overlong messages itself.
pub const CHAR_BUDGET: usize = 500;
pub const CHAR_WARN_THRESHOLD: usize = 450;

pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// The input area grows with the message, up to this many text rows.
pub const MAX_INPUT_LINES: u16 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Chat,
    AttachImage,
    ConfirmClear,
    ConfirmQuit,
    Preview,
    Quit,
}

/// All ephemeral UI state. The busy flag and the visible message tally are
/// private; only the dispatch functions below mutate them, and the HTTP
/// client is injected at construction so tests can point it at a local
/// mock server.
pub struct App {
    pub mode: Mode,
    pub input: String,
    pub attach_input: String,
    pub chat_scroll: u16,
    pub notifications: Vec<Notification>,
    pub status_indicator: StatusIndicator,
    pub preview_url: Option<String>,
    messages: Vec<Message>,
    busy: bool,
    message_count: usize,
    client: ChatClient,
}

impl App {
    pub fn new(client: ChatClient, greeting: impl Into<String>) -> App {
        let greeting = Message::counterpart_text(greeting, Local::now().to_rfc3339());
        App {
            mode: Mode::Chat,
            input: String::new(),
            attach_input: String::new(),
            chat_scroll: 0,
            notifications: Vec::new(),
            status_indicator: StatusIndicator::new(),
            preview_url: None,
            messages: vec![greeting],
            busy: false,
            message_count: 0,
            client,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Rendered messages excluding the greeting. Display only.
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    #[cfg(test)]
    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notifications.push(Notification::new(message, severity));
    }

    pub fn prune_notifications(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.scroll_to_bottom();
        self.recount();
    }

    fn recount(&mut self) {
        self.message_count = self.messages.len().saturating_sub(1);
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// The draw pass clamps this back to the real maximum.
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = u16::MAX;
    }

    pub fn request_clear(&mut self) {
        self.mode = Mode::ConfirmClear;
    }

    /// Quit immediately unless a submission is in flight with unsent input
    /// still in the field; that combination gets a confirmation first.
    pub fn request_quit(&mut self) {
        if self.busy && !self.input.trim().is_empty() {
            self.mode = Mode::ConfirmQuit;
        } else {
            self.mode = Mode::Quit;
        }
    }

    /// Opens the newest image message full-screen.
    pub fn open_preview(&mut self) {
        let latest = self
            .messages
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::Image)
            .map(|m| m.content.clone());

        match latest {
            Some(filename) => {
                self.preview_url = Some(self.client.upload_url(&filename));
                self.mode = Mode::Preview;
            }
            None => self.notify("No image to preview yet", Severity::Info),
        }
    }

    pub fn close_preview(&mut self) {
        self.preview_url = None;
        self.mode = Mode::Chat;
    }
}

/// Sends the input buffer as a text message. Guarded by the busy flag: a
/// second invocation while one is in flight returns without touching
/// anything. The outgoing message is rendered optimistically before the
/// request goes out; the flag is cleared on every exit path.
pub async fn submit_text(app: Arc<Mutex<App>>) {
    let (client, message) = {
        let mut guard = app.lock().await;
        if guard.busy {
            return;
        }
        let message = guard.input.trim().to_string();
        if message.is_empty() {
            guard.notify("Type a message first", Severity::Warning);
            return;
        }
        guard.busy = true;
        guard.status_indicator.set_sending(true);
        guard.push_message(Message::outgoing_text(message.as_str()));
        guard.input.clear();
        (guard.client.clone(), message)
    };

    let result = client.send_message(&message).await;

    let mut guard = app.lock().await;
    match result {
        Ok(reply) => {
            guard.push_message(Message::counterpart_text(reply.reply, reply.timestamp));
        }
        Err(e) => {
            log::error!("sending message failed: {}", e);
            guard.notify("Sending failed, try again later", Severity::Error);
        }
    }
    guard.busy = false;
    guard.status_indicator.set_sending(false);
}

/// Uploads the file named in the attach buffer. Validation failures abort
/// before any request and leave the buffer in place so the path can be
/// corrected; once a request has been attempted the buffer is cleared
/// regardless of outcome.
pub async fn submit_image(app: Arc<Mutex<App>>) {
    let (client, path, file_name, mime) = {
        let mut guard = app.lock().await;
        if guard.busy {
            return;
        }
        let raw = guard.attach_input.trim().to_string();
        match validate_image(&raw) {
            Ok((path, file_name, mime)) => {
                guard.busy = true;
                guard.status_indicator.set_sending(true);
                guard.status_indicator.set_status("Uploading...");
                (guard.client.clone(), path, file_name, mime)
            }
            Err(e) => {
                guard.notify(e.to_string(), Severity::Warning);
                return;
            }
        }
    };

    let result = match fs::read(&path) {
        Ok(bytes) => client.upload_image(&file_name, bytes, mime).await,
        Err(e) => Err(ConfidanteError::api_error(format!(
            "Could not read {}: {}",
            path.display(),
            e
        ))),
    };

    let mut guard = app.lock().await;
    guard.attach_input.clear();
    guard.mode = Mode::Chat;
    match result {
        Ok(upload) => {
            guard.push_message(Message::outgoing_image(upload.filename));
            guard.push_message(Message::counterpart_text(
                upload.reply,
                Local::now().to_rfc3339(),
            ));
            guard.notify("Image sent", Severity::Success);
        }
        Err(e) => {
            log::error!("image upload failed: {}", e);
            guard.notify("Upload failed, try again later", Severity::Error);
        }
    }
    guard.busy = false;
    guard.status_indicator.set_sending(false);
    guard.status_indicator.clear_status();
}

fn validate_image(raw: &str) -> ConfidanteResult<(PathBuf, String, &'static str)> {
    if raw.is_empty() {
        return Err(ConfidanteError::validation_error(
            "Select an image file first",
        ));
    }
    let path = PathBuf::from(raw);
    let metadata = fs::metadata(&path)
        .map_err(|_| ConfidanteError::validation_error(format!("No such file: {}", raw)))?;
    if !metadata.is_file() {
        return Err(ConfidanteError::validation_error(format!(
            "Not a file: {}",
            raw
        )));
    }
    let mime = crate::utils::image_mime_type(raw)
        .ok_or_else(|| ConfidanteError::validation_error("Only image files can be sent"))?;
    if metadata.len() > MAX_IMAGE_BYTES {
        return Err(ConfidanteError::validation_error(
            "Images must be 10 MB or smaller",
        ));
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok((path, file_name, mime))
}

/// Replaces everything but the greeting with the server's history. Failures
/// are logged and swallowed; history is best-effort on startup.
pub async fn load_history(app: Arc<Mutex<App>>) {
    let client = { app.lock().await.client.clone() };

    let result = client.fetch_history().await;

    let mut guard = app.lock().await;
    match result {
        Ok(history) if !history.is_empty() => {
            guard.messages.truncate(1);
            guard.messages.extend(history);
            guard.scroll_to_bottom();
            guard.recount();
        }
        Ok(_) => {}
        Err(e) => {
            log::warn!("loading history failed: {}", e);
        }
    }
}

/// Deletes the server-side history. Only ever reached through the
/// confirmation overlay; the greeting survives the wipe.
pub async fn clear_history(app: Arc<Mutex<App>>) {
    let client = {
        let mut guard = app.lock().await;
        guard.mode = Mode::Chat;
        guard.client.clone()
    };

    let result = client.clear_history().await;

    let mut guard = app.lock().await;
    match result {
        Ok(()) => {
            guard.messages.truncate(1);
            guard.recount();
            guard.notify("Chat history cleared", Severity::Success);
        }
        Err(e) => {
            log::error!("clearing history failed: {}", e);
            guard.notify("Could not clear history", Severity::Error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GREETING: &str = "Hey, you're back!";

    fn test_app(server_uri: &str) -> Arc<Mutex<App>> {
        Arc::new(Mutex::new(App::new(ChatClient::new(server_uri), GREETING)))
    }

    async fn requests_to(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }

    fn mock_chat_success() -> Mock {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "reply": "tell me more!",
                "timestamp": "2024-03-01T09:15:02"
            })))
    }

    #[tokio::test]
    async fn empty_message_never_reaches_the_network() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        app.lock().await.input = "   \n ".to_string();

        submit_text(app.clone()).await;

        {
            let guard = app.lock().await;
            assert_eq!(guard.messages().len(), 1);
            assert!(guard
                .notifications
                .iter()
                .any(|n| n.severity == Severity::Warning));
            assert!(!guard.is_busy());
        }
        assert_eq!(requests_to(&server).await, 0);
    }

    #[tokio::test]
    async fn second_submit_while_busy_is_a_no_op() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        {
            let mut guard = app.lock().await;
            guard.busy = true;
            guard.input = "hello".to_string();
        }

        submit_text(app.clone()).await;

        {
            let guard = app.lock().await;
            assert_eq!(guard.messages().len(), 1);
            assert_eq!(guard.input, "hello");
        }
        assert_eq!(requests_to(&server).await, 0);
    }

    #[tokio::test]
    async fn successful_submit_renders_outgoing_and_reply() {
        let server = MockServer::start().await;
        mock_chat_success().mount(&server).await;
        let app = test_app(&server.uri());
        app.lock().await.input = "hello".to_string();

        submit_text(app.clone()).await;

        let guard = app.lock().await;
        assert_eq!(guard.messages().len(), 3);
        assert_eq!(guard.message_count(), 2);
        assert_eq!(guard.messages()[1].sender, Sender::User);
        assert_eq!(guard.messages()[2].sender, Sender::Counterpart);
        assert_eq!(guard.messages()[2].content, "tell me more!");
        assert!(guard.input.is_empty());
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn failed_submit_restores_affordances() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let app = test_app(&server.uri());
        app.lock().await.input = "hello".to_string();

        submit_text(app.clone()).await;

        let guard = app.lock().await;
        assert!(!guard.is_busy());
        assert!(guard
            .notifications
            .iter()
            .any(|n| n.severity == Severity::Error));
        // the optimistic outgoing render stays
        assert_eq!(guard.messages().len(), 2);
    }

    #[tokio::test]
    async fn image_upload_renders_two_blocks_and_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("photo.jpg");
        fs::write(&file_path, vec![0u8; 5 * 1024 * 1024]).unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "filename": "20240301_photo.jpg",
                "reply": "what a nice shot!"
            })))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        {
            let mut guard = app.lock().await;
            guard.mode = Mode::AttachImage;
            guard.attach_input = file_path.display().to_string();
        }

        submit_image(app.clone()).await;

        let guard = app.lock().await;
        assert_eq!(guard.messages().len(), 3);
        assert_eq!(guard.messages()[1].kind, MessageKind::Image);
        assert_eq!(guard.messages()[1].content, "20240301_photo.jpg");
        assert_eq!(guard.messages()[2].content, "what a nice shot!");
        assert!(guard
            .notifications
            .iter()
            .any(|n| n.severity == Severity::Success));
        assert!(guard.attach_input.is_empty());
        assert_eq!(guard.mode, Mode::Chat);
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn oversize_image_is_rejected_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.jpg");
        fs::write(&file_path, vec![0u8; 11 * 1024 * 1024]).unwrap();

        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        {
            let mut guard = app.lock().await;
            guard.mode = Mode::AttachImage;
            guard.attach_input = file_path.display().to_string();
        }

        submit_image(app.clone()).await;

        {
            let guard = app.lock().await;
            assert_eq!(guard.messages().len(), 1);
            assert!(guard
                .notifications
                .iter()
                .any(|n| n.severity == Severity::Warning));
            // buffer stays so the path can be corrected
            assert!(!guard.attach_input.is_empty());
            assert!(!guard.is_busy());
        }
        assert_eq!(requests_to(&server).await, 0);
    }

    #[tokio::test]
    async fn non_image_file_is_rejected_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("notes.txt");
        fs::write(&file_path, b"not an image").unwrap();

        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        app.lock().await.attach_input = file_path.display().to_string();

        submit_image(app.clone()).await;

        {
            let guard = app.lock().await;
            assert_eq!(guard.messages().len(), 1);
            assert!(guard
                .notifications
                .iter()
                .any(|n| n.severity == Severity::Warning));
        }
        assert_eq!(requests_to(&server).await, 0);
    }

    #[tokio::test]
    async fn clear_history_preserves_greeting_and_resets_count() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "history cleared"
            })))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        {
            let mut guard = app.lock().await;
            guard.push_message(Message::outgoing_text("hello"));
            guard.push_message(Message::counterpart_text("hi!", "2024-03-01T09:15:02"));
            guard.mode = Mode::ConfirmClear;
        }

        clear_history(app.clone()).await;

        let guard = app.lock().await;
        assert_eq!(guard.messages().len(), 1);
        assert_eq!(guard.messages()[0].content, GREETING);
        assert_eq!(guard.message_count(), 0);
        assert_eq!(guard.mode, Mode::Chat);
        assert!(guard
            .notifications
            .iter()
            .any(|n| n.severity == Severity::Success));
    }

    #[tokio::test]
    async fn failed_clear_leaves_messages_and_notifies() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        app.lock().await.push_message(Message::outgoing_text("hello"));

        clear_history(app.clone()).await;

        let guard = app.lock().await;
        assert_eq!(guard.messages().len(), 2);
        assert!(guard
            .notifications
            .iter()
            .any(|n| n.severity == Severity::Error));
    }

    #[tokio::test]
    async fn history_load_replaces_all_but_the_greeting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "history": [
                    {"sender": "user", "type": "text", "content": "earlier",
                     "timestamp": "2024-03-01T09:15:00"},
                    {"sender": "girlfriend", "type": "text", "content": "I remember!",
                     "timestamp": "2024-03-01T09:15:02"}
                ]
            })))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        // stale local render that the reload must replace
        app.lock().await.push_message(Message::outgoing_text("stale"));

        load_history(app.clone()).await;

        let guard = app.lock().await;
        assert_eq!(guard.messages().len(), 3);
        assert_eq!(guard.messages()[0].content, GREETING);
        assert_eq!(guard.messages()[1].content, "earlier");
        assert_eq!(guard.message_count(), 2);
    }

    #[tokio::test]
    async fn empty_history_leaves_the_view_alone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "history": []
            })))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        app.lock().await.push_message(Message::outgoing_text("keep me"));

        load_history(app.clone()).await;

        assert_eq!(app.lock().await.messages().len(), 2);
    }

    #[tokio::test]
    async fn history_load_failure_is_silent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        load_history(app.clone()).await;

        let guard = app.lock().await;
        assert_eq!(guard.messages().len(), 1);
        assert!(guard.notifications.is_empty());
    }

    #[tokio::test]
    async fn quit_guard_only_fires_when_busy_with_unsent_input() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());

        {
            let mut guard = app.lock().await;
            guard.busy = true;
            guard.input = "half-typed".to_string();
            guard.request_quit();
            assert_eq!(guard.mode, Mode::ConfirmQuit);

            guard.mode = Mode::Chat;
            guard.input.clear();
            guard.request_quit();
            assert_eq!(guard.mode, Mode::Quit);
        }
    }

    #[tokio::test]
    async fn preview_targets_the_newest_image_message() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        {
            let mut guard = app.lock().await;
            guard.push_message(Message::outgoing_image("first.jpg"));
            guard.push_message(Message::outgoing_image("second.jpg"));
            guard.open_preview();
            assert_eq!(guard.mode, Mode::Preview);
            let url = guard.preview_url.clone().unwrap();
            assert!(url.ends_with("/uploads/second.jpg"));

            guard.close_preview();
            assert_eq!(guard.mode, Mode::Chat);
            assert!(guard.preview_url.is_none());
        }
    }

    #[tokio::test]
    async fn preview_without_images_just_notifies() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let mut guard = app.lock().await;
        guard.open_preview();
        assert_eq!(guard.mode, Mode::Chat);
        assert!(guard
            .notifications
            .iter()
            .any(|n| n.severity == Severity::Info));
    }
}
