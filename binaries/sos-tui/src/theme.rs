//! Colors and styles for the SOS terminal UI.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct ThemePalette {
    pub bg: Color,
    pub fg: Color,

    pub primary: Color,
    pub danger: Color,
    pub success: Color,
    pub warning: Color,

    pub border: Color,
    pub border_active: Color,

    pub text_muted: Color,
    pub text_highlight: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::dark()
    }
}

impl ThemePalette {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(18, 18, 24),
            fg: Color::Rgb(220, 220, 230),

            primary: Color::Rgb(100, 149, 237),  // Cornflower blue
            danger: Color::Rgb(231, 76, 60),     // Alizarin
            success: Color::Rgb(46, 204, 113),   // Emerald
            warning: Color::Rgb(241, 196, 15),   // Sun flower

            border: Color::Rgb(60, 60, 80),
            border_active: Color::Rgb(100, 149, 237),

            text_muted: Color::Rgb(120, 120, 140),
            text_highlight: Color::Rgb(255, 215, 0),
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// The SOS button while it can be pressed.
    pub fn danger_style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.danger)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success).add_modifier(Modifier::BOLD)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Disabled controls and secondary text.
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.text_highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn primary_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn border_style(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.border_active)
        } else {
            Style::default().fg(self.border)
        }
    }
}
