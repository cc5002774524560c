//! SMTP notifier.
//!
//! Sends the report over an implicit-TLS authenticated relay. When no
//! credentials are configured the notifier is inert and every send is
//! reported as [`Delivery::Skipped`]. A notifier built with
//! [`SmtpNotifier::unavailable`] fails every send instead.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use wsbalert_core::MailConfig;

use crate::error::NotifyError;

/// Outcome of a send attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No credentials configured; nothing was sent.
    Skipped,
}

struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

enum State {
    Disabled,
    Ready(Mailer),
    Unavailable(String),
}

pub struct SmtpNotifier {
    state: State,
}

impl SmtpNotifier {
    /// Build a notifier from mail settings.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Address`] if the sender or recipient is not a
    /// valid address, or [`NotifyError::Transport`] if the relay TLS
    /// parameters cannot be built for `smtp_host`.
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let (Some(sender), Some(password)) = (&config.sender, &config.app_password) else {
            tracing::info!("mail credentials not configured; notifications disabled");
            return Ok(Self::disabled());
        };

        let from = parse_mailbox(sender)?;
        let to = parse_mailbox(config.recipient().unwrap_or(sender.as_str()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(sender.clone(), password.clone()))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self {
            state: State::Ready(Mailer {
                transport,
                from,
                to,
            }),
        })
    }

    /// A notifier that never sends.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            state: State::Disabled,
        }
    }

    /// A notifier whose every send fails with [`NotifyError::Unavailable`].
    ///
    /// Stands in when the mail settings were rejected, so the rest of a run
    /// proceeds and the failure is reported at delivery time.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: State::Unavailable(reason.into()),
        }
    }

    /// Build from `config`, falling back to [`SmtpNotifier::unavailable`]
    /// when the settings are rejected. The rejection is logged at `error`.
    #[must_use]
    pub fn from_config_or_unavailable(config: &MailConfig) -> Self {
        Self::from_config(config).unwrap_or_else(|e| {
            tracing::error!(error = %e, "invalid mail settings; report delivery will fail");
            Self::unavailable(e.to_string())
        })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Send an HTML message with the given subject.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Message`] if the message cannot be assembled,
    /// [`NotifyError::Transport`] on connection, TLS, auth or timeout
    /// failure, or [`NotifyError::Unavailable`] if the settings were rejected.
    pub async fn send(&self, subject: &str, html: &str) -> Result<Delivery, NotifyError> {
        let mailer = match &self.state {
            State::Ready(mailer) => mailer,
            State::Disabled => {
                tracing::info!(subject, "notification skipped: no mail credentials");
                return Ok(Delivery::Skipped);
            }
            State::Unavailable(reason) => return Err(NotifyError::Unavailable(reason.clone())),
        };

        let message = build_message(&mailer.from, &mailer.to, subject, html)?;
        mailer.transport.send(message).await?;

        tracing::info!(to = %mailer.to, subject, "report email sent");
        Ok(Delivery::Sent)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::Address {
            address: address.to_string(),
            source,
        })
}

fn build_message(
    from: &Mailbox,
    to: &Mailbox,
    subject: &str,
    html: &str,
) -> Result<Message, NotifyError> {
    let message = Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html.to_string())?;
    Ok(message)
}
