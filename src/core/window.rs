use winit::window::{Fullscreen, Window};

/// Window size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimized or collapsed to nothing on either axis
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// What the frame loop needs from the windowing system
pub trait WindowContext {
    /// Current size in physical pixels
    fn dimensions(&self) -> WindowDimensions;

    /// Ask for another redraw callback
    fn request_redraw(&self);

    fn set_title(&self, title: &str);

    /// Switch between windowed and borderless fullscreen
    fn toggle_fullscreen(&self);

    /// Request a redraw unless the window has no area.
    ///
    /// A minimized window gets no redraws, so the event loop sleeps until the
    /// next resize instead of spinning on skipped frames.
    fn request_redraw_if_visible(&self) -> bool {
        if self.dimensions().is_empty() {
            return false;
        }
        self.request_redraw();
        true
    }
}

impl WindowContext for Window {
    fn dimensions(&self) -> WindowDimensions {
        let size = self.inner_size();
        WindowDimensions::new(size.width, size.height)
    }

    fn request_redraw(&self) {
        Window::request_redraw(self);
    }

    fn set_title(&self, title: &str) {
        Window::set_title(self, title);
    }

    fn toggle_fullscreen(&self) {
        let next = match self.fullscreen() {
            Some(_) => None,
            None => Some(Fullscreen::Borderless(None)),
        };
        self.set_fullscreen(next);
    }
}

/// Title shown once at startup: `"<base> - <backend>"`
pub fn window_title(base: &str, backend: Option<wgpu::Backend>) -> String {
    match backend {
        Some(backend) => format!("{} - {:?}", base, backend),
        None => base.to_string(),
    }
}
