// SPDX-License-Identifier: GPL-3.0-only

//! Terminal calibration console
//!
//! Shows the warped projection output with Unicode half-block characters and
//! feeds key presses to the projection's calibration bindings. Esc or Ctrl+C
//! quits; `R` asks for a `y` before resetting.

use crate::projection::ProjectionSurface;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbaImage;
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::info;

/// Run the calibration console until the operator quits
pub fn run_calibration(
    surface: ProjectionSurface,
) -> Result<ProjectionSurface, Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut console = Console::new(surface);
    let result = console.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    info!(css = %console.surface.store().css(), "Calibration console closed");
    Ok(console.surface)
}

struct Console {
    surface: ProjectionSurface,
    preview: FrameWidget,
    pending_reset: Option<KeyEvent>,
    status: String,
}

impl Console {
    fn new(surface: ProjectionSurface) -> Self {
        let status = surface.store().css().to_string();
        Self {
            preview: FrameWidget::new(surface.frame()),
            surface,
            pending_reset: None,
            status,
        }
    }

    fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            terminal.draw(|f| {
                let area = f.area();

                // Reserve bottom line for status
                let preview_area = Rect {
                    height: area.height.saturating_sub(1),
                    ..area
                };
                f.render_widget(&self.preview, preview_area);

                let status_area = Rect {
                    x: area.x,
                    y: area.height.saturating_sub(1),
                    width: area.width,
                    height: 1,
                };
                f.render_widget(
                    StatusBar {
                        message: &self.status,
                    },
                    status_area,
                );
            })?;

            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                let ctrl_c =
                    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c || key.code == KeyCode::Esc {
                    break;
                }
                self.on_key(key);
            }
        }
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        if let Some(reset) = self.pending_reset.take() {
            let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
            self.surface.handle_key(&reset, || confirmed);
            self.refresh();
            return;
        }

        if matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')) {
            self.pending_reset = Some(key);
            self.status = "Reset calibration to defaults? (y/n)".to_string();
            return;
        }

        if self.surface.handle_key(&key, || false).is_some() {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.preview = FrameWidget::new(self.surface.frame());
        self.status = self.surface.store().css().to_string();
    }
}

/// Widget that renders an image using half-block characters
struct FrameWidget {
    image: RgbaImage,
}

impl FrameWidget {
    fn new(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels using half-block characters
        let aspect = width as f64 / height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > aspect {
            let h = term_height;
            ((h * aspect) as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            (w as u16, (w / aspect / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = width as f64 / display_width as f64;
        let y_scale = height as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let top = sample(&self.image, src_x, (ty as f64 * 2.0 * y_scale) as u32);
                let bottom = sample(&self.image, src_x, ((ty as f64 * 2.0 + 1.0) * y_scale) as u32);

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }
    }
}

fn sample(image: &RgbaImage, x: u32, y: u32) -> Color {
    let pixel = image.get_pixel(x.min(image.width() - 1), y.min(image.height() - 1));
    Color::Rgb(pixel[0], pixel[1], pixel[2])
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
