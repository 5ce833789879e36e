use crate::app::{App, Mode, CHAR_BUDGET, CHAR_WARN_THRESHOLD, MAX_INPUT_LINES};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const ACCENT: Color = Color::Rgb(255, 170, 200);

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let input_rows = input_height(&app.input);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(input_rows + 2),
            ]
            .as_ref(),
        )
        .margin(1)
        .split(size);

    draw_header(f, app, chunks[0]);
    draw_messages(f, app, chunks[1]);
    app.status_indicator.render(f, chunks[2]);
    draw_input(f, app, chunks[3]);
    draw_notifications(f, app, size);

    match app.mode {
        Mode::AttachImage => draw_attach_overlay(f, app, size),
        Mode::ConfirmClear => draw_confirm_clear(f, size),
        Mode::ConfirmQuit => draw_confirm_quit(f, size),
        Mode::Preview => draw_preview(f, app, size),
        _ => {}
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let left = "confidante";
    let tagline = " · she's online";
    let count = format!("{} messages", app.message_count());

    let pad = (area.width as usize)
        .saturating_sub(left.width() + tagline.width() + count.width());

    let header = Line::from(vec![
        Span::styled(
            left,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(tagline, Style::default().fg(Color::DarkGray)),
        Span::raw(" ".repeat(pad)),
        Span::styled(count, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let mut lines = Vec::new();
    for message in app.messages() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(message.render(area));
    }

    let total_lines = lines.len() as u16;
    let max_scroll = total_lines.saturating_sub(area.height);
    if app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }

    let msgs_para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(msgs_para.scroll((app.chat_scroll, 0)), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let rule_style = Style::default().fg(Color::DarkGray);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "─".repeat(area.width as usize),
            rule_style,
        ))),
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    // Dimmed text doubles as the disabled affordance while a send is in
    // flight; key handlers drop edits in that state.
    let input_style = if app.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let prefix_style = Style::default().fg(Color::DarkGray);

    let text_lines: Vec<Line> = app
        .input
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 { "→ " } else { "  " };
            Line::from(vec![
                Span::styled(prefix, prefix_style),
                Span::styled(line.to_string(), input_style),
            ])
        })
        .collect();

    let rows = input_height(&app.input);
    let scroll_y = (text_lines.len() as u16).saturating_sub(rows);
    f.render_widget(
        Paragraph::new(text_lines).scroll((scroll_y, 0)),
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: rows,
        },
    );

    // Bottom rule carries the character counter; it warns but never blocks.
    let count = app.input.chars().count();
    let counter = format!(" {}/{} ", count, CHAR_BUDGET);
    let counter_style = if count > CHAR_WARN_THRESHOLD {
        Style::default().fg(Color::Red)
    } else {
        rule_style
    };
    let rule_width = (area.width as usize).saturating_sub(counter.width());
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("─".repeat(rule_width), rule_style),
            Span::styled(counter, counter_style),
        ])),
        Rect {
            x: area.x,
            y: area.y + area.height - 1,
            width: area.width,
            height: 1,
        },
    );

    if app.mode == Mode::Chat && !app.is_busy() {
        let last_line = app.input.split('\n').next_back().unwrap_or("");
        let cursor_row = (app.input.split('\n').count() as u16)
            .saturating_sub(1)
            .min(rows.saturating_sub(1));
        let cursor_x = area.x + 2 + last_line.width() as u16;
        f.set_cursor_position((
            cursor_x.min(area.x + area.width.saturating_sub(1)),
            area.y + 1 + cursor_row,
        ));
    }
}

fn draw_notifications(f: &mut Frame, app: &App, size: Rect) {
    for (i, notification) in app.notifications.iter().enumerate() {
        let label = format!(
            "{} {}",
            notification.severity.icon(),
            notification.message
        );
        let width = (label.width() as u16 + 4).min(size.width.saturating_sub(4));
        let height = 3;
        let y = 1 + i as u16 * height;
        if y + height > size.height {
            break;
        }
        let area = Rect {
            x: size.width.saturating_sub(width + 2),
            y,
            width,
            height,
        };
        let color = notification.severity.color();

        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    notification.severity.icon(),
                    Style::default().fg(color),
                ),
                Span::raw(" "),
                Span::styled(
                    notification.message.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
            area,
        );
    }
}

fn draw_attach_overlay(f: &mut Frame, app: &App, size: Rect) {
    let area = centered_rect(60, 7, size);
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(vec![
            Span::styled("path: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                app.attach_input.clone(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "png · jpg · gif · webp, up to 10 MB",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Enter to send · Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Attach image")
                .border_style(Style::default().fg(ACCENT)),
        ),
        area,
    );

    let cursor_x = area.x + 7 + app.attach_input.width() as u16;
    f.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
}

fn draw_confirm_clear(f: &mut Frame, size: Rect) {
    let area = centered_rect(46, 7, size);
    f.render_widget(Clear, area);

    let text = "Delete every saved message?\nThis cannot be undone.\n\nPress 'y' to clear or 'n' to keep them.";
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Clear history")
                    .border_style(Style::default().fg(Color::LightYellow)),
            ),
        area,
    );
}

fn draw_confirm_quit(f: &mut Frame, size: Rect) {
    let area = centered_rect(46, 7, size);
    f.render_widget(Clear, area);

    let text = "A message is still sending and your draft\nisn't sent yet.\n\nPress 'y' to quit anyway or 'n' to stay.";
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Quit?")
                    .border_style(Style::default().fg(Color::LightYellow)),
            ),
        area,
    );
}

fn draw_preview(f: &mut Frame, app: &App, size: Rect) {
    let area = Rect {
        x: size.x + 2,
        y: size.y + 1,
        width: size.width.saturating_sub(4),
        height: size.height.saturating_sub(2),
    };
    f.render_widget(Clear, area);

    let url = app.preview_url.clone().unwrap_or_default();
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "🖼",
            Style::default().fg(ACCENT),
        )),
        Line::from(""),
        Line::from(Span::styled(url, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(
            "press any key to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Image preview")
                    .border_style(Style::default().fg(ACCENT)),
            ),
        area,
    );
}

fn input_height(input: &str) -> u16 {
    (input.split('\n').count().max(1) as u16).min(MAX_INPUT_LINES)
}

fn centered_rect(width: u16, height: u16, size: Rect) -> Rect {
    let w = width.min(size.width);
    let h = height.min(size.height);
    Rect {
        x: size.x + (size.width - w) / 2,
        y: size.y + (size.height - h) / 2,
        width: w,
        height: h,
    }
}
