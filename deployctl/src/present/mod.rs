//! Result presentation

pub mod console;

/// Receives what the user should see about the current attempt
pub trait Presenter: Send + Sync {
    /// Replace the status line; an empty string blanks it
    fn set_status(&self, message: &str);

    /// Replace the preview with a frame showing `url`
    fn show_preview(&self, url: &str);
}
