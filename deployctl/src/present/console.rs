//! Terminal presenter

use std::sync::Mutex;

use chrono::Local;
use colored::Colorize;

use crate::present::Presenter;

/// Prints status changes and preview links to stdout
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    status: Mutex<String>,
    preview: Mutex<Option<String>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last status line shown
    pub fn status(&self) -> String {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// URL currently shown in the preview area
    pub fn preview(&self) -> Option<String> {
        self.preview.lock().ok().and_then(|p| p.clone())
    }
}

impl Presenter for ConsolePresenter {
    fn set_status(&self, message: &str) {
        if let Ok(mut status) = self.status.lock() {
            *status = message.to_string();
        }

        let stamp = Local::now().format("%H:%M:%S").to_string();
        let line = if message.is_empty() {
            "(status cleared)".dimmed()
        } else if message.starts_with("Error") {
            message.red().bold()
        } else if message.starts_with("Done") || message.starts_with("Build complete") {
            message.green().bold()
        } else {
            message.normal()
        };
        println!("{} {}", stamp.dimmed(), line);
    }

    fn show_preview(&self, url: &str) {
        if let Ok(mut preview) = self.preview.lock() {
            *preview = Some(url.to_string());
        }
        println!("{} {}", "Preview:".cyan().bold(), url.underline());
    }
}
