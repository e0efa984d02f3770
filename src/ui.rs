// src/ui.rs
use iced::widget::container;
use iced::{Background, Color, Theme};
use once_cell::sync::Lazy;

pub struct Styles {
    pub bg: Color,
    pub fg: Color,
    pub muted_fg: Color,
    pub panel_bg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub cell_fg: Color,
    pub error_bg: Color,
    pub error_fg: Color,
    pub accent: Color,
    pub footer_bg: Color,
    pub footer_fg: Color,
}

pub static LIGHT_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    bg: Color::from_rgb(0.976, 0.980, 0.984),        // #f9fafb
    fg: Color::from_rgb(0.067, 0.094, 0.153),        // #111827
    muted_fg: Color::from_rgb(0.420, 0.447, 0.502),  // #6b7280
    panel_bg: Color::from_rgb(1.0, 1.0, 1.0),
    header_bg: Color::from_rgb(0.976, 0.980, 0.984), // #f9fafb
    header_fg: Color::from_rgb(0.420, 0.447, 0.502),
    cell_fg: Color::from_rgb(0.420, 0.447, 0.502),
    error_bg: Color::from_rgb(0.996, 0.949, 0.949),  // #fef2f2
    error_fg: Color::from_rgb(0.725, 0.110, 0.110),  // #b91c1c
    accent: Color::from_rgb(0.231, 0.510, 0.965),    // #3b82f6
    footer_bg: Color::from_rgb(0.0078, 0.325, 0.6118), // #02539c
    footer_fg: Color::from_rgb(1.0, 1.0, 1.0),
});

pub static DARK_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    bg: Color::from_rgb(0.0, 0.0, 0.0),
    fg: Color::from_rgb(1.0, 1.0, 1.0),
    muted_fg: Color::from_rgb(0.7, 0.7, 0.7),
    panel_bg: Color::from_rgb(0.1, 0.1, 0.1),
    header_bg: Color::from_rgb(0.2, 0.2, 0.2),
    header_fg: Color::from_rgb(1.0, 1.0, 1.0),
    cell_fg: Color::from_rgb(0.9, 0.9, 0.9),
    error_bg: Color::from_rgb(0.3, 0.05, 0.05),
    error_fg: Color::from_rgb(1.0, 0.6, 0.6),
    accent: Color::from_rgb(0.231, 0.510, 0.965),
    footer_bg: Color::from_rgb(0.0078, 0.325, 0.6118), // #02539c
    footer_fg: Color::from_rgb(1.0, 1.0, 1.0),
});

pub fn palette(dark: bool) -> &'static Styles {
    if dark {
        &DARK_THEME
    } else {
        &LIGHT_THEME
    }
}

/// Flat filled box.
pub struct ContainerStyle {
    pub bg: Color,
    pub fg: Option<Color>,
}

impl ContainerStyle {
    pub fn filled(bg: Color) -> iced::theme::Container {
        iced::theme::Container::Custom(Box::new(ContainerStyle { bg, fg: None }))
    }

    pub fn with_text(bg: Color, fg: Color) -> iced::theme::Container {
        iced::theme::Container::Custom(Box::new(ContainerStyle { bg, fg: Some(fg) }))
    }
}

impl container::StyleSheet for ContainerStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            background: Some(Background::Color(self.bg)),
            text_color: self.fg,
            ..Default::default()
        }
    }
}
