//! Alert delivery over plain SMTP.

use brandinput_core::{EmailConfig, Notification, Notifier};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum NotifyError {
    #[error("invalid email address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("no recipients configured")]
    NoRecipients,
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends alerts through an unauthenticated relay, as internal mail hosts
/// usually expose on port 25.
pub(crate) struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    subject: String,
}

impl SmtpNotifier {
    pub(crate) fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .build();

        let to = mailboxes(&config.to)?;
        if to.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        Ok(Self {
            transport,
            from: mailbox(&config.from)?,
            to,
            cc: config.cc.as_deref().map(mailboxes).transpose()?.unwrap_or_default(),
            subject: config.subject.clone(),
        })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        for cc in &self.cc {
            builder = builder.cc(cc.clone());
        }
        Ok(builder.body(notification.body())?)
    }
}

impl Notifier for SmtpNotifier {
    type Error = NotifyError;

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.build_message(notification)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::Address {
            address: address.to_string(),
            source,
        })
}

/// Comma- or semicolon-separated addresses; blanks are skipped.
fn mailboxes(list: &str) -> Result<Vec<Mailbox>, NotifyError> {
    list.split([',', ';'])
        .filter(|part| !part.trim().is_empty())
        .map(mailbox)
        .collect()
}
