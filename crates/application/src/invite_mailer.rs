//! Invite and reminder mail composition.
//!
//! The mailer renders the plain-text and HTML bodies, embeds a freshly
//! issued confirmation link and hands the message to an [`EmailService`].

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use kinboard_core::{AppError, AppResult};
use kinboard_domain::{Event, Invite};

use crate::ConfirmationTokenService;

/// Port for sending emails. Infrastructure provides SMTP or console implementations.
///
/// Transport failures are reported as `AppError::Delivery`.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text email with an optional HTML alternative.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}

/// Renders and dispatches invite and reminder mail.
#[derive(Clone)]
pub struct InviteMailer {
    email_service: Arc<dyn EmailService>,
    token_service: ConfirmationTokenService,
    base_url: Url,
}

impl InviteMailer {
    /// Creates a mailer whose links point at `base_url`.
    pub fn new(
        email_service: Arc<dyn EmailService>,
        token_service: ConfirmationTokenService,
        base_url: &str,
    ) -> AppResult<Self> {
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(normalized.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid confirmation base url '{base_url}': {error}"))
        })?;

        Ok(Self {
            email_service,
            token_service,
            base_url,
        })
    }

    /// Builds `<base-url>/confirm-invite?token=<token>` for an invite.
    pub fn confirmation_link(&self, invite: &Invite) -> AppResult<String> {
        let token = self.token_service.issue(invite.id(), invite.event_id())?;

        let mut link = self.base_url.join("confirm-invite").map_err(|error| {
            AppError::Internal(format!("failed to build confirmation link: {error}"))
        })?;
        link.query_pairs_mut().append_pair("token", token.as_str());

        Ok(link.into())
    }

    /// Sends the initial invitation with a confirmation link.
    pub async fn send_invite(&self, invite: &Invite, event: &Event, owner_name: &str) -> AppResult<()> {
        let link = self.confirmation_link(invite)?;
        let details = event.details();
        let when = describe_when(event);

        let subject = format!("{owner_name} invited you to {}", details.name());
        let text_body = format!(
            "Hi {name},\n\n\
             {owner_name} has invited you to {event_name} on {when}{location}.\n\n\
             Let them know you are coming by opening the link below:\n{link}\n\n\
             This link expires in 24 hours.",
            name = invite.invitee().name(),
            event_name = details.name(),
            location = describe_location(details.location()),
        );

        let mut html_body = String::new();
        let _ = write!(
            html_body,
            "<p>Hi {name},</p>\
             <p>{owner} has invited you to <strong>{event_name}</strong> on {when}{location}.</p>\
             <p><a href=\"{href}\">Confirm that you are coming</a></p>\
             <p>This link expires in 24 hours.</p>",
            name = escape_html(invite.invitee().name()),
            owner = escape_html(owner_name),
            event_name = escape_html(details.name()),
            when = escape_html(when.as_str()),
            location = escape_html(describe_location(details.location()).as_str()),
            href = escape_html(link.as_str()),
        );

        self.email_service
            .send_email(
                invite.invitee().email().as_str(),
                subject.as_str(),
                text_body.as_str(),
                Some(html_body.as_str()),
            )
            .await
    }

    /// Sends the reminder for an upcoming event. Pending invitees also get a
    /// new confirmation link since the original one has most likely expired.
    pub async fn send_reminder(&self, invite: &Invite, event: &Event) -> AppResult<()> {
        let details = event.details();
        let when = describe_when(event);
        let location = describe_location(details.location());
        let link = if invite.is_coming() {
            None
        } else {
            Some(self.confirmation_link(invite)?)
        };

        let subject = format!("Reminder: {} is coming up", details.name());
        let mut text_body = format!(
            "Hi {name},\n\n\
             This is a reminder that {event_name} takes place on {when}{location}.",
            name = invite.invitee().name(),
            event_name = details.name(),
        );
        let mut html_body = format!(
            "<p>Hi {name},</p>\
             <p>This is a reminder that <strong>{event_name}</strong> takes place on {when}{location}.</p>",
            name = escape_html(invite.invitee().name()),
            event_name = escape_html(details.name()),
            when = escape_html(when.as_str()),
            location = escape_html(location.as_str()),
        );

        if let Some(link) = link {
            let _ = write!(
                text_body,
                "\n\nYou have not confirmed yet. Let the host know you are coming:\n{link}"
            );
            let _ = write!(
                html_body,
                "<p>You have not confirmed yet. <a href=\"{}\">Confirm that you are coming</a></p>",
                escape_html(link.as_str())
            );
        } else {
            text_body.push_str("\n\nSee you there!");
            html_body.push_str("<p>See you there!</p>");
        }

        self.email_service
            .send_email(
                invite.invitee().email().as_str(),
                subject.as_str(),
                text_body.as_str(),
                Some(html_body.as_str()),
            )
            .await
    }
}

fn describe_when(event: &Event) -> String {
    let details = event.details();
    format!(
        "{} at {}",
        details.date().format("%A, %B %-d, %Y"),
        details.time().format("%H:%M")
    )
}

fn describe_location(location: &str) -> String {
    if location.is_empty() {
        String::new()
    } else {
        format!(" ({location})")
    }
}

/// Escapes the five HTML-significant characters.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use kinboard_domain::UserId;

    use super::escape_html;
    use crate::test_support::{InMemoryStore, RecordingEmailService, mailer, token_service};

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn confirmation_link_carries_a_decodable_token() {
        let store = InMemoryStore::default();
        let invite = store.seed_invite(7, 3, "guest@example.com");
        let mailer = mailer(Arc::new(RecordingEmailService::default()));

        let link = mailer.confirmation_link(&invite);
        assert!(link.is_ok());
        let link = url::Url::parse(link.unwrap_or_default().as_str());
        assert!(link.is_ok());
        let link = link.unwrap_or_else(|_| unreachable!());

        assert_eq!(link.path(), "/confirm-invite");
        let token = link
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        let claims = token_service().decode(token.as_str());
        assert_eq!(
            claims.ok().map(|claims| (claims.invite_id.value(), claims.event_id.value())),
            Some((7, 3))
        );
    }

    #[test]
    fn base_url_with_path_keeps_its_prefix() {
        let store = InMemoryStore::default();
        let invite = store.seed_invite(1, 1, "guest@example.com");
        let mailer = crate::InviteMailer::new(
            Arc::new(RecordingEmailService::default()),
            token_service(),
            "https://example.com/family/",
        )
        .unwrap_or_else(|_| unreachable!());

        let link = mailer.confirmation_link(&invite).unwrap_or_default();
        assert!(link.starts_with("https://example.com/family/confirm-invite?token="));
    }

    #[tokio::test]
    async fn invite_mail_is_html_escaped_and_addressed_to_invitee() {
        let store = InMemoryStore::default();
        let event = store.seed_event(3, UserId::new(), NaiveDate::from_ymd_opt(2026, 5, 1).unwrap_or_default());
        let invite = store.seed_invite(7, 3, "guest@example.com");
        let email_service = Arc::new(RecordingEmailService::default());
        let mailer = mailer(email_service.clone());

        let result = mailer.send_invite(&invite, &event, "<Mom>").await;
        assert!(result.is_ok());

        let sent = email_service.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "guest@example.com");
        assert!(sent[0].subject.contains("<Mom>"));
        let html = sent[0].html_body.clone().unwrap_or_default();
        assert!(html.contains("&lt;Mom&gt;"));
        assert!(html.contains("https://kinboard.test/confirm-invite?token="));
        assert!(sent[0].text_body.contains("Friday, May 1, 2026 at 18:00"));
    }

    #[tokio::test]
    async fn reminder_for_confirmed_invite_has_no_link() {
        let store = InMemoryStore::default();
        let event = store.seed_event(3, UserId::new(), NaiveDate::from_ymd_opt(2026, 5, 1).unwrap_or_default());
        let mut invite = store.seed_invite(7, 3, "guest@example.com");
        let _ = invite.confirm();
        let email_service = Arc::new(RecordingEmailService::default());

        let result = mailer(email_service.clone())
            .send_reminder(&invite, &event)
            .await;
        assert!(result.is_ok());

        let sent = email_service.sent();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].text_body.contains("confirm-invite"));
    }
}
