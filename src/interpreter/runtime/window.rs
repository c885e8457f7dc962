use thiserror::Error;

/// Default window dimensions reported by hosts that do not choose their own.
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (800, 800);

/// Failures reported by a window collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// `draw_window` before `init_window`.
    #[error("no window has been initialised")]
    NotInitialised,
    /// A second `init_window` while a window is open.
    #[error("a window is already open")]
    AlreadyOpen,
    /// A host-specific failure.
    #[error("{0}")]
    Backend(String),
}

/// The window subsystem as seen by programs.
///
/// `draw_window` presents one frame. Real hosts poll input there as well,
/// which is how a window learns it has been closed.
pub trait WindowHost {
    /// Opens a window with the given title.
    fn init_window(&mut self, title: &str) -> Result<(), WindowError>;
    /// Presents one frame.
    fn draw_window(&mut self) -> Result<(), WindowError>;
    /// Reports whether the window is still open.
    fn is_window_open(&self) -> bool;
}

/// A window that renders nothing.
///
/// It counts frames and closes itself once `frame_limit` frames have been
/// drawn, which lets `$? is_window_open() { draw_window(); }` loops terminate
/// under test. Without a limit it stays open.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWindow {
    title:       Option<String>,
    open:        bool,
    frames:      u64,
    frame_limit: Option<u64>,
}

impl HeadlessWindow {
    /// Creates a headless window that closes after `frame_limit` frames.
    #[must_use]
    pub const fn new(frame_limit: Option<u64>) -> Self {
        Self { title: None,
               open: false,
               frames: 0,
               frame_limit }
    }

    /// Frames drawn so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Title passed to `init_window`, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl WindowHost for HeadlessWindow {
    fn init_window(&mut self, title: &str) -> Result<(), WindowError> {
        if self.open {
            return Err(WindowError::AlreadyOpen);
        }
        let (width, height) = DEFAULT_WINDOW_SIZE;
        tracing::debug!(title, width, height, "headless window opened");
        self.title = Some(title.to_string());
        self.open = self.frame_limit != Some(0);
        self.frames = 0;
        Ok(())
    }

    fn draw_window(&mut self) -> Result<(), WindowError> {
        if self.title.is_none() {
            return Err(WindowError::NotInitialised);
        }
        if !self.open {
            return Ok(());
        }
        self.frames += 1;
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            tracing::debug!(frames = self.frames, "headless window reached its frame limit");
            self.open = false;
        }
        Ok(())
    }

    fn is_window_open(&self) -> bool {
        self.open
    }
}
