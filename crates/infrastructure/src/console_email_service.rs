//! Mail transport for local development.
//!
//! Nothing leaves the machine: every message is written to the tracing
//! output, with the links it contains pulled out so a confirmation link can
//! be opened straight from the log.

use async_trait::async_trait;
use kinboard_application::EmailService;
use kinboard_core::AppResult;
use tracing::info;

/// Email service that logs messages instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a console email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        let links = extract_links(text_body);

        info!(
            to,
            subject,
            html_bytes = html_body.map_or(0, str::len),
            links = ?links,
            "mail not delivered (console transport)\n{text_body}"
        );

        Ok(())
    }
}

/// Returns the `http`/`https` URLs in a plain-text body, in order.
fn extract_links(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|word| word.starts_with("http://") || word.starts_with("https://"))
        .map(|word| word.trim_end_matches(['.', ',', ')', '>']))
        .collect()
}
