use std::io::{self, Stdout};
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, info};

use crate::{
    animation::{Playback, Ticker},
    frames::FrameSequence,
    render::{cell_size, PixelArt},
};

/// Cosmetic display theme, toggled with the `d` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    const fn background(self) -> Color {
        match self {
            Self::Dark => Color::Black,
            Self::Light => Color::White,
        }
    }

    const fn foreground(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    const fn chrome(self) -> Style {
        match self {
            Self::Dark => Style::new().fg(Color::Black).bg(Color::Gray),
            Self::Light => Style::new().fg(Color::White).bg(Color::DarkGray),
        }
    }
}

/// The viewer session: one frame sequence, a cycling playback cursor and
/// the incidental theme state.
#[derive(Debug)]
pub struct App {
    title: String,
    frames: FrameSequence,
    playback: Playback,
    theme: Theme,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(image_path: &Path, frames: FrameSequence) -> Self {
        let title = image_path.file_name().map_or_else(
            || image_path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let playback = Playback::new(frames.len());
        Self {
            title,
            frames,
            playback,
            theme: Theme::default(),
            should_quit: false,
        }
    }

    /// Runs the event loop until a quit key is pressed.
    ///
    /// The first frame is drawn immediately; afterwards the loop polls for
    /// input until the frame timer's next deadline, advances playback on
    /// each elapsed period and redraws.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing or terminal input fails.
    #[tracing::instrument(level = "debug", skip(self, terminal))]
    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!(
            "Starting viewer session with {} frame(s), delay {:?}",
            self.frames.len(),
            self.frames.delay()
        );
        let mut ticker = Ticker::new(self.frames.delay());
        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .context("Failed to draw frame")?;
            if event::poll(ticker.timeout()).context("Failed to poll for input")? {
                if let Event::Key(key) = event::read().context("Failed to read input event")? {
                    self.on_key(key);
                }
            }
            if ticker.tick() {
                self.playback.advance();
            }
        }
        info!("Viewer session ended");
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('d') => {
                self.theme = self.theme.toggled();
                debug!("Toggled theme to {:?}", self.theme);
            }
            _ => (),
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Block::new().style(
                Style::new()
                    .fg(self.theme.foreground())
                    .bg(self.theme.background()),
            ),
            frame.area(),
        );
        frame.render_widget(
            Paragraph::new(format!(" pixview: {}", self.title)).style(self.theme.chrome()),
            header,
        );
        frame.render_widget(
            Paragraph::new(self.footer_text()).style(self.theme.chrome()),
            footer,
        );

        let (width, height) = cell_size();
        frame.render_widget(
            PixelArt::new(
                self.frames.frame(self.playback.index()),
                self.theme.background(),
            ),
            centered(body, width, height),
        );
    }

    fn footer_text(&self) -> String {
        if self.frames.len() > 1 {
            format!(
                " d toggle theme | q quit | frame {}/{}",
                self.playback.index() + 1,
                self.frames.len()
            )
        } else {
            " d toggle theme | q quit".to_string()
        }
    }
}

/// Puts the terminal into raw mode on the alternate screen.
///
/// # Errors
///
/// Returns an error if the terminal cannot be configured.
#[tracing::instrument(level = "debug")]
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide).context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// Returns the terminal to its normal state. Must run even when the
/// session itself failed, so the shell is left usable.
///
/// # Errors
///
/// Returns an error if the terminal state cannot be restored.
#[tracing::instrument(level = "debug", skip(terminal))]
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to restore cursor")?;
    Ok(())
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use image::{Rgba, RgbaImage};
    use ratatui::backend::TestBackend;

    use super::*;

    fn test_app(frame_count: usize) -> App {
        let frames = (0..frame_count)
            .map(|_| RgbaImage::from_pixel(50, 50, Rgba([255, 0, 255, 255])))
            .collect();
        App::new(
            Path::new("fixtures/sprite.gif"),
            FrameSequence::from_parts(frames, Duration::from_millis(100)),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn starts_on_the_first_frame_with_the_dark_theme() {
        let app = test_app(3);
        assert_eq!(app.playback.index(), 0);
        assert_eq!(app.theme, Theme::Dark);
        assert!(!app.should_quit);
    }

    #[test]
    fn theme_key_toggles_between_dark_and_light() {
        let mut app = test_app(1);
        app.on_key(press(KeyCode::Char('d')));
        assert_eq!(app.theme, Theme::Light);
        app.on_key(press(KeyCode::Char('d')));
        assert_eq!(app.theme, Theme::Dark);
    }

    #[test]
    fn quit_keys_end_the_session() {
        for key in [
            press(KeyCode::Char('q')),
            press(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = test_app(1);
            app.on_key(key);
            assert!(app.should_quit);
        }
    }

    #[test]
    fn key_release_events_are_ignored() {
        let mut app = test_app(1);
        app.on_key(KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert!(!app.should_quit);
    }

    #[test]
    fn draw_places_title_and_hints_around_the_image() {
        let app = test_app(2);
        let mut terminal = Terminal::new(TestBackend::new(60, 28)).unwrap();

        terminal.draw(|frame| app.draw(frame)).unwrap();

        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains("pixview: sprite.gif"));
        assert!(rendered.contains("frame 1/2"));
        assert!(rendered.contains("▀"));
    }
}
