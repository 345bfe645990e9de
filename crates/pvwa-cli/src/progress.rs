//! Terminal progress display for recording downloads

use indicatif::{ProgressBar, ProgressStyle};
use pvwa_core::DownloadProgress;
use std::sync::Mutex;

const BAR_TEMPLATE: &str = "{msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})";
const SPINNER_TEMPLATE: &str = "{spinner:.blue} {msg} {bytes} ({bytes_per_sec})";

/// Shows one transient bar per recording while it downloads
#[derive(Default)]
pub struct TerminalProgress {
    current: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.current.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl DownloadProgress for TerminalProgress {
    fn on_start(&self, session_id: &str, expected_len: Option<u64>) {
        let bar = match expected_len {
            Some(len) => ProgressBar::new(len).with_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            ),
            None => ProgressBar::new_spinner().with_style(
                ProgressStyle::with_template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            ),
        };
        bar.set_message(format!("Downloading {}", session_id));

        if let Ok(mut guard) = self.current.lock()
            && let Some(previous) = guard.replace(bar)
        {
            previous.finish_and_clear();
        }
    }

    fn on_chunk(&self, _session_id: &str, bytes_so_far: u64) {
        self.with_bar(|bar| bar.set_position(bytes_so_far));
    }

    fn on_finish(&self, _session_id: &str, _bytes: u64) {
        if let Ok(mut guard) = self.current.lock()
            && let Some(bar) = guard.take()
        {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_lifecycle() {
        let progress = TerminalProgress::new();
        progress.on_start("1_1", Some(100));
        progress.on_chunk("1_1", 40);
        progress.with_bar(|bar| assert_eq!(bar.position(), 40));
        progress.on_finish("1_1", 100);
        assert!(progress.current.lock().unwrap().is_none());
    }

    #[test]
    fn test_unknown_length_uses_spinner() {
        let progress = TerminalProgress::new();
        progress.on_start("1_2", None);
        progress.on_chunk("1_2", 4096);
        progress.with_bar(|bar| {
            assert_eq!(bar.position(), 4096);
            assert_eq!(bar.length(), None);
        });
        progress.on_finish("1_2", 4096);
    }

    #[test]
    fn test_new_download_replaces_unfinished_bar() {
        let progress = TerminalProgress::new();
        progress.on_start("1_3", Some(10));
        progress.on_chunk("1_3", 5);
        progress.on_start("1_4", Some(20));
        progress.with_bar(|bar| {
            assert_eq!(bar.length(), Some(20));
            assert_eq!(bar.position(), 0);
        });
        progress.on_finish("1_4", 20);
        assert!(progress.current.lock().unwrap().is_none());
    }

    #[test]
    fn test_templates_parse() {
        assert!(ProgressStyle::with_template(BAR_TEMPLATE).is_ok());
        assert!(ProgressStyle::with_template(SPINNER_TEMPLATE).is_ok());
    }
}
