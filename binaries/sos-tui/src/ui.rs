//! Layout and rendering.

use crate::app::App;
use crate::theme::ThemePalette;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base_style()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Saved number
            Constraint::Length(5), // SOS button
            Constraint::Length(3), // Number input
            Constraint::Length(3), // Save button
            Constraint::Min(3),    // Alert history
            Constraint::Length(1), // Footer shortcuts
        ])
        .split(area);

    render_header(frame, app, palette, chunks[0]);
    render_saved_number(frame, app, palette, chunks[1]);
    render_sos_button(frame, app, palette, chunks[2]);
    render_input(frame, app, palette, chunks[3]);
    render_save_button(frame, palette, chunks[4]);
    render_alert_log(frame, app, palette, chunks[5]);
    render_footer(frame, palette, chunks[6]);

    if app.popup.is_some() {
        render_alert_popup(frame, app, palette);
    }
}

fn panel<'a>(palette: &ThemePalette, title: &'a str, active: bool) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border_style(active))
        .style(palette.base_style())
}

fn render_header(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let state_style = if app.state.is_sending() {
        palette.warning_style()
    } else {
        palette.muted_style()
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "  🚨 SOS",
            Style::default()
                .fg(palette.danger)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ALERT", palette.primary_style()),
        Span::styled("   │   ", palette.muted_style()),
        Span::styled(app.state.display(), state_style),
    ]))
    .block(panel(palette, "", false));
    frame.render_widget(header, area);
}

fn render_saved_number(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let line = match (&app.saved, app.loaded) {
        (Some(number), _) => Line::from(vec![
            Span::raw(" Saved SOS Number: "),
            Span::styled(number.as_str(), palette.highlight_style()),
        ]),
        (None, true) => Line::from(Span::styled(
            " Set your SOS Number",
            palette.warning_style(),
        )),
        (None, false) => Line::from(Span::styled(" Loading...", palette.muted_style())),
    };
    frame.render_widget(Paragraph::new(line).block(panel(palette, "", false)), area);
}

fn render_sos_button(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let (style, border) = if app.can_send() {
        (palette.danger_style(), Style::default().fg(palette.danger))
    } else {
        (palette.muted_style(), palette.border_style(false))
    };

    let button = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}  ", app.sos_label()), style)),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(border)
            .style(palette.base_style()),
    );
    frame.render_widget(button, area);
}

fn render_input(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let editing = app.popup.is_none();
    let mut spans = vec![Span::raw(" "), Span::raw(app.input.as_str())];
    if editing && app.tick_count % 10 < 5 {
        spans.push(Span::styled("▏", palette.primary_style()));
    }
    if app.input.is_empty() {
        spans.push(Span::styled("Enter SOS Phone Number", palette.muted_style()));
    }

    let input = Paragraph::new(Line::from(spans)).block(panel(palette, " Phone ", editing));
    frame.render_widget(input, area);
}

fn render_save_button(frame: &mut Frame, palette: &ThemePalette, area: Rect) {
    let button = Paragraph::new(Line::from(Span::styled(
        "Save as Default SOS Number",
        palette.success_style(),
    )))
    .alignment(Alignment::Center)
    .block(panel(palette, "", false));
    frame.render_widget(button, area);
}

fn render_alert_log(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let items: Vec<ListItem> = app
        .alerts
        .iter()
        .rev()
        .map(|alert| {
            let body_style = if alert.kind.is_error() {
                Style::default().fg(palette.danger)
            } else {
                Style::default().fg(palette.fg)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    alert.raised_at.format("%H:%M:%S ").to_string(),
                    palette.muted_style(),
                ),
                Span::raw(format!("{} ", alert.kind.icon())),
                Span::styled(format!("{}: ", alert.title), palette.primary_style()),
                Span::styled(alert.body.as_str(), body_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(panel(palette, " History ", false));
    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, palette: &ThemePalette, area: Rect) {
    let key = palette.highlight_style();
    let text = palette.muted_style();
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" F5", key),
        Span::styled(" send SOS  ", text),
        Span::styled("Enter", key),
        Span::styled(" save  ", text),
        Span::styled("Esc", key),
        Span::styled(" dismiss  ", text),
        Span::styled("Ctrl+Q", key),
        Span::styled(" quit", text),
    ]));
    frame.render_widget(footer, area);
}

fn render_alert_popup(frame: &mut Frame, app: &App, palette: &ThemePalette) {
    let Some(alert) = &app.popup else {
        return;
    };
    let area = frame.area();

    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height.saturating_sub(2));
    let popup_area = Rect {
        x: (area.width - popup_width) / 2,
        y: (area.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let border = if alert.kind.is_error() {
        palette.danger
    } else {
        palette.success
    };
    let popup = Paragraph::new(vec![
        Line::from(""),
        Line::from(alert.body.as_str()),
        Line::from(""),
        Line::from(Span::styled("Esc to dismiss", palette.muted_style())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(format!(" {} {} ", alert.kind.icon(), alert.title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(palette.base_style()),
    );
    frame.render_widget(popup, popup_area);
}
