use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];
const IDLE_HINT: &str = "Enter send · ^O attach · ^L clear · ^P preview · Esc quit";

#[derive(Debug)]
pub struct StatusIndicator {
    sending: bool,
    status_text: String,
    spinner_idx: usize,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            sending: false,
            status_text: String::new(),
            spinner_idx: 0,
        }
    }

    pub fn set_sending(&mut self, sending: bool) {
        self.sending = sending;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status_text = status.into();
    }

    pub fn clear_status(&mut self) {
        self.status_text.clear();
    }

    pub fn update_spinner(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (glyph, text, color) = if self.sending {
            let frame_glyph = SPINNER_FRAMES[self.spinner_idx % SPINNER_FRAMES.len()];
            let text = if self.status_text.is_empty() {
                "Sending..."
            } else {
                self.status_text.as_str()
            };
            (frame_glyph, text, Color::Yellow)
        } else {
            (" ", IDLE_HINT, Color::DarkGray)
        };

        let status = Line::from(vec![
            Span::styled(glyph, Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(text, Style::default().fg(color)),
        ]);

        frame.render_widget(
            Paragraph::new(status),
            Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            },
        );
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}
