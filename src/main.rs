use anyhow::Context;
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::Mutex;

use confidante::{
    api::ChatClient,
    app::{self, App, Mode},
    chat_view, config, key_handlers, logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::initialize_config().context("loading configuration")?;
    let config = config::get_config();
    let _logger = logging::init(&config.log_level).context("starting logger")?;

    let client = ChatClient::new(config.server_url.clone());
    let app = Arc::new(Mutex::new(App::new(client, config.greeting.clone())));

    // History is best-effort; don't hold up the first frame for it.
    tokio::spawn(app::load_history(app.clone()));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: Arc<Mutex<App>>,
) -> anyhow::Result<()> {
    loop {
        {
            let mut guard = app.lock().await;
            guard.prune_notifications();
            guard.status_indicator.update_spinner();
            if guard.mode == Mode::Quit {
                return Ok(());
            }
            terminal.draw(|f| chat_view::draw(f, &mut guard))?;
        }

        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    key_handlers::handle_key(key, app.clone()).await;
                }
            }
        }
    }
}
