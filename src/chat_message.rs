use crate::models::{Message, MessageKind, Sender};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

const USER_ACCENT: Color = Color::Rgb(255, 223, 128);
const COUNTERPART_ACCENT: Color = Color::Rgb(255, 170, 200);

/// Best-effort human-readable timestamp. The backend emits bare ISO-8601
/// without an offset, outgoing messages carry RFC 3339; anything else is
/// shown as-is rather than failing the render.
pub fn format_timestamp(raw: &str) -> String {
    let Some(local) = parse_timestamp(raw) else {
        return raw.to_string();
    };

    let now = Local::now();
    let today = now.date_naive();

    if local.date_naive() == today {
        local.format("%H:%M").to_string()
    } else if Some(local.date_naive()) == today.pred_opt() {
        format!("yesterday {}", local.format("%H:%M"))
    } else {
        local.format("%m-%d %H:%M").to_string()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local));
    }

    // Server timestamps have no offset; treat them as local time.
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local.from_local_datetime(&naive).single()
}

impl Message {
    /// Renders the message as a bubble: a header with the avatar glyph and
    /// timestamp, the wrapped body, and a closing rule. User messages are
    /// indented to the right, mirroring the sender split in the window.
    pub fn render(&self, area: Rect) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let style = self.accent_style();
        let indent = self.indent();

        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("┌─ ".to_string(), style),
            Span::styled(self.avatar().to_string(), style),
            Span::styled(" ".to_string(), style),
            Span::styled(
                format_timestamp(&self.timestamp),
                style.add_modifier(Modifier::DIM),
            ),
        ]));

        match self.kind {
            MessageKind::Text => self.render_text(&mut lines, area, style, indent),
            MessageKind::Image => self.render_image(&mut lines, style, indent),
        }

        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("╰─".to_string(), style),
        ]));

        lines
    }

    fn render_text(&self, lines: &mut Vec<Line<'static>>, area: Rect, style: Style, indent: &str) {
        let wrap_width = (area.width as usize).saturating_sub(6).max(8);

        for paragraph in self.content.lines() {
            if paragraph.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled(indent.to_string(), style),
                    Span::styled("│".to_string(), style),
                ]));
                continue;
            }
            for wrapped_line in wrap(paragraph, wrap_width) {
                lines.push(Line::from(vec![
                    Span::styled(indent.to_string(), style),
                    Span::styled("│ ".to_string(), style),
                    Span::styled(wrapped_line.to_string(), style),
                ]));
            }
        }
    }

    fn render_image(&self, lines: &mut Vec<Line<'static>>, style: Style, indent: &str) {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled("🖼 ".to_string(), style),
            Span::styled(
                self.content.clone(),
                style.add_modifier(Modifier::UNDERLINED),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled(
                "Ctrl+P to preview".to_string(),
                style.add_modifier(Modifier::DIM),
            ),
        ]));
    }

    fn accent_style(&self) -> Style {
        Style::default().fg(match self.sender {
            Sender::User => USER_ACCENT,
            Sender::Counterpart => COUNTERPART_ACCENT,
        })
    }

    fn avatar(&self) -> &'static str {
        match self.sender {
            Sender::User => "👤",
            Sender::Counterpart => "👧",
        }
    }

    fn indent(&self) -> &'static str {
        match self.sender {
            Sender::User => "  ",
            Sender::Counterpart => "",
        }
    }
}
