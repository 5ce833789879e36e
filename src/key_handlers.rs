use crate::app::{self, App, Mode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_key(key: KeyEvent, app: Arc<Mutex<App>>) {
    let mode = { app.lock().await.mode };
    match mode {
        Mode::Chat => handle_chat_key(key, app).await,
        Mode::AttachImage => handle_attach_key(key, app).await,
        Mode::ConfirmClear => handle_confirm_clear_key(key, app).await,
        Mode::ConfirmQuit => handle_confirm_quit_key(key, app).await,
        // any key dismisses the preview
        Mode::Preview => app.lock().await.close_preview(),
        Mode::Quit => {}
    }
}

async fn handle_chat_key(key: KeyEvent, app: Arc<Mutex<App>>) {
    match key.code {
        // Shift+Enter inserts a newline; Alt+Enter covers terminals that
        // don't report the shifted chord.
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            let mut guard = app.lock().await;
            if !guard.is_busy() {
                guard.input.push('\n');
            }
        }
        KeyCode::Enter => {
            tokio::spawn(app::submit_text(app.clone()));
        }
        KeyCode::Esc => app.lock().await.request_quit(),
        KeyCode::PageUp => app.lock().await.scroll_up(),
        KeyCode::PageDown => app.lock().await.scroll_down(),
        KeyCode::Backspace => {
            let mut guard = app.lock().await;
            if !guard.is_busy() {
                guard.input.pop();
            }
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            'c' => app.lock().await.request_quit(),
            'l' => app.lock().await.request_clear(),
            'o' => app.lock().await.mode = Mode::AttachImage,
            'p' => app.lock().await.open_preview(),
            'u' => app.lock().await.scroll_up(),
            'd' => app.lock().await.scroll_down(),
            _ => {}
        },
        KeyCode::Char(c) => {
            let mut guard = app.lock().await;
            if !guard.is_busy() {
                guard.input.push(c);
            }
        }
        _ => {}
    }
}

async fn handle_attach_key(key: KeyEvent, app: Arc<Mutex<App>>) {
    match key.code {
        KeyCode::Enter => {
            tokio::spawn(app::submit_image(app.clone()));
        }
        KeyCode::Esc => app.lock().await.mode = Mode::Chat,
        KeyCode::Backspace => {
            app.lock().await.attach_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.lock().await.attach_input.push(c);
        }
        _ => {}
    }
}

async fn handle_confirm_clear_key(key: KeyEvent, app: Arc<Mutex<App>>) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            tokio::spawn(app::clear_history(app.clone()));
        }
        KeyCode::Char('n') | KeyCode::Esc => app.lock().await.mode = Mode::Chat,
        _ => {}
    }
}

async fn handle_confirm_quit_key(key: KeyEvent, app: Arc<Mutex<App>>) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.lock().await.mode = Mode::Quit,
        KeyCode::Char('n') | KeyCode::Esc => app.lock().await.mode = Mode::Chat,
        _ => {}
    }
}
