// src/main.rs
use std::future::Future;

use iced::alignment::Horizontal;
use iced::widget::{column, container, row, scrollable, text, Column, Row, Space};
use iced::{
    executor, keyboard, subscription, window, Alignment, Application, Color, Command, Element,
    Event, Length, Settings, Subscription, Theme,
};
use tracing_subscriber::EnvFilter;

mod cloud_handler;
mod config;
mod data_types;
mod display;
mod errors;
mod poller;
mod ui;
mod viewer;

use cloud_handler::GoogleSheets;
use config::{AppConfig, ViewerConfig};
use data_types::Table;
use display::{render_sheet, render_status, SheetView, TableLayout, NO_DATA};
use errors::SheetError;
use ui::{ContainerStyle, Styles};
use viewer::Viewer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sheet_viewer=info")),
        )
        .init();

    if let Err(err) = dotenv {
        if !err.not_found() {
            tracing::warn!(error = %err, "could not read .env");
        }
    }

    let args = AppConfig::parse();
    let flags = Flags {
        config: args.viewer_config(),
        dark: args.dark,
    };

    SheetViewer::run(Settings {
        window: window::Settings {
            size: (1024, 768),
            resizable: true,
            ..Default::default()
        },
        ..Settings::with_flags(flags)
    })?;
    Ok(())
}

struct Flags {
    config: Result<ViewerConfig, SheetError>,
    dark: bool,
}

struct SheetViewer {
    styles: &'static Styles,
    viewer: Viewer<GoogleSheets>,
}

#[derive(Debug, Clone)]
enum Message {
    ClientInitialized(Result<GoogleSheets, SheetError>),
    Tick,
    Fetched(Result<Table, SheetError>),
    Exit,
}

impl Application for SheetViewer {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = Flags;

    fn new(flags: Flags) -> (Self, Command<Message>) {
        let mut viewer = Viewer::new(flags.config);
        let command = match viewer.mount(GoogleSheets::new()) {
            Some(init) => Command::perform(init, Message::ClientInitialized),
            None => Command::none(),
        };

        (
            SheetViewer {
                styles: ui::palette(flags.dark),
                viewer,
            },
            command,
        )
    }

    fn title(&self) -> String {
        String::from("Google Sheets Viewer")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::ClientInitialized(result) => fetch(self.viewer.client_initialized(result)),
            Message::Tick => fetch(self.viewer.tick()),
            Message::Fetched(result) => {
                self.viewer.fetch_finished(result);
                Command::none()
            }
            Message::Exit => {
                tracing::info!(phase = ?self.viewer.phase(), "shutting down");
                self.viewer.shutdown();
                window::close()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = subscription::events_with(|event, _status| match event {
            Event::Keyboard(keyboard::Event::KeyPressed {
                key_code: keyboard::KeyCode::Escape,
                ..
            }) => Some(Message::Exit),
            _ => None,
        });

        // The timer lives only while the poller is polling.
        if self.viewer.is_polling() {
            Subscription::batch([
                keys,
                iced::time::every(self.viewer.poll_interval()).map(|_| Message::Tick),
            ])
        } else {
            keys
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let styles = self.styles;
        let display = self.viewer.display();
        let status = render_status(&display.status);
        let sheet = render_sheet(
            display.table.as_ref(),
            display.status.is_loading,
            display.status.fetch_error.as_ref(),
        );

        let mut heading = column![
            text("Google Sheets Viewer").size(30).style(styles.fg),
            text("View your Google Sheet data").size(16).style(styles.muted_fg),
        ]
        .spacing(6)
        .align_items(Alignment::Center);
        if let Some(notice) = status.auto_update_notice {
            heading = heading.push(text(notice).size(14).style(styles.muted_fg));
        }
        if let Some(line) = status.last_updated {
            heading = heading.push(text(line).size(12).style(styles.muted_fg));
        }

        let mut body = column![container(heading).width(Length::Fill).center_x()]
            .spacing(20)
            .padding(24)
            .height(Length::Fill);
        if let Some(banner) = status.banner {
            body = body.push(error_box(banner, styles));
        }
        body = body.push(
            container(sheet_view(sheet, styles))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(ContainerStyle::filled(styles.panel_bg)),
        );

        let footer = container(
            row![
                text(format!("Google Sheets Viewer v{}", VERSION))
                    .size(14)
                    .style(styles.footer_fg),
                Space::with_width(Length::Fill),
                text("Esc to quit").size(14).style(styles.footer_fg),
            ]
            .spacing(5),
        )
        .width(Length::Fill)
        .padding(10)
        .style(ContainerStyle::filled(styles.footer_bg));

        container(column![body, footer])
            .width(Length::Fill)
            .height(Length::Fill)
            .style(ContainerStyle::filled(styles.bg))
            .into()
    }
}

fn fetch(
    request: Option<impl Future<Output = Result<Table, SheetError>> + Send + 'static>,
) -> Command<Message> {
    match request {
        Some(request) => Command::perform(request, Message::Fetched),
        None => Command::none(),
    }
}

fn sheet_view<'a>(sheet: SheetView, styles: &'static Styles) -> Element<'a, Message> {
    match sheet {
        SheetView::Loading => container(text("Loading...").size(18).style(styles.accent))
            .width(Length::Fill)
            .padding(32)
            .center_x()
            .into(),
        SheetView::Error(message) => error_box(message, styles),
        SheetView::NoData => container(
            text(NO_DATA)
                .size(16)
                .style(styles.muted_fg)
                .horizontal_alignment(Horizontal::Center),
        )
        .width(Length::Fill)
        .padding(32)
        .center_x()
        .into(),
        SheetView::Table(layout) => table_view(layout, styles),
    }
}

fn error_box<'a>(message: String, styles: &'static Styles) -> Element<'a, Message> {
    container(text(message).size(16))
        .width(Length::Fill)
        .padding(16)
        .style(ContainerStyle::with_text(styles.error_bg, styles.error_fg))
        .into()
}

fn table_view<'a>(layout: TableLayout, styles: &'static Styles) -> Element<'a, Message> {
    let portion = column_portion(layout.column_width_percent);
    let columns = layout.column_count();

    let header = grid_row(layout.headers, columns, portion, styles.header_fg, styles.header_bg);
    let rows = layout
        .rows
        .into_iter()
        .map(|cells| grid_row(cells, columns, portion, styles.cell_fg, styles.panel_bg))
        .collect();

    scrollable(column![header, Column::with_children(rows).spacing(1)].spacing(1))
        .height(Length::Fill)
        .into()
}

/// One row of `columns` equal cells; missing trailing cells stay blank.
fn grid_row<'a>(
    cells: Vec<String>,
    columns: usize,
    portion: u16,
    fg: Color,
    bg: Color,
) -> Element<'a, Message> {
    let blanks = columns.saturating_sub(cells.len());
    let mut row: Vec<Element<'a, Message>> = cells
        .into_iter()
        .map(|value| cell(value, portion, fg, bg))
        .collect();
    row.extend((0..blanks).map(|_| Space::with_width(Length::FillPortion(portion)).into()));
    Row::with_children(row).spacing(1).into()
}

fn cell<'a>(value: String, portion: u16, fg: Color, bg: Color) -> Element<'a, Message> {
    container(text(value).size(14).style(fg))
        .width(Length::FillPortion(portion))
        .padding([10, 16])
        .style(ContainerStyle::filled(bg))
        .into()
}

/// Equal percentages map to equal fill portions.
fn column_portion(percent: f32) -> u16 {
    (percent * 100.0).round().clamp(1.0, f32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_columns_get_equal_portions() {
        assert_eq!(column_portion(50.0), 5000);
        assert_eq!(column_portion(100.0), 10000);
        assert_eq!(column_portion(100.0 / 3.0), 3333);
        assert_eq!(column_portion(0.0), 1);
    }
}
