use std::sync::Mutex;

use authreq_api::{Navigator, Notifier, Response};

/// Prints failure notices to stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn error(&self, text: &str) {
        eprintln!("error: {}", text);
    }
}

/// Remembers where the client wanted to navigate. A terminal has no router,
/// so the CLI turns the redirect into a hint after the request finishes.
#[derive(Default)]
pub struct RecordingNavigator {
    target: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn target(&self) -> Option<String> {
        self.target.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        *self.target.lock().unwrap_or_else(|e| e.into_inner()) = Some(path.to_string());
    }
}

/// Renders the status line followed by the body, pretty-printing JSON.
pub fn format_response(resp: &Response) -> String {
    let body = match serde_json::from_slice::<serde_json::Value>(&resp.body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| resp.text()),
        Err(_) => resp.text(),
    };
    let status_line = format!("{} {}", resp.status.as_u16(), resp.status_text);
    if body.is_empty() {
        status_line
    } else {
        format!("{}\n{}", status_line, body)
    }
}

pub fn print_response(resp: &Response) {
    println!("{}", format_response(resp));
}
