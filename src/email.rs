//! Outgoing email: SMTP transport and quick templates.
//!
//! Per the error model, senders report outcomes as spoken sentences
//! rather than typed errors; the session speaks whatever comes back.

use crate::config::EmailConfig;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

/// Sends email on behalf of the user.
pub trait EmailSender: Send {
    /// Send one message; the returned sentence is spoken verbatim.
    fn send(&self, to: &str, subject: &str, body: &str) -> String;
}

/// SMTP sender (STARTTLS + credentials).
pub struct SmtpSender {
    config: EmailConfig,
}

impl SmtpSender {
    /// Create a sender from config. Missing credentials are reported at
    /// send time, not here, so the assistant still starts.
    #[must_use]
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

impl EmailSender for SmtpSender {
    fn send(&self, to: &str, subject: &str, body: &str) -> String {
        if self.config.sender_email.is_empty() || self.config.sender_password.is_empty() {
            return "Email not configured. Please set SABLE_SENDER_EMAIL and \
                    SABLE_SENDER_PASSWORD environment variables."
                .to_owned();
        }

        let from: Mailbox = match self.config.sender_email.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => return format!("Failed to send email: invalid sender address: {e}"),
        };
        let to_mailbox: Mailbox = match to.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => return format!("Failed to send email: invalid recipient address: {e}"),
        };

        let message = match Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_owned())
        {
            Ok(message) => message,
            Err(e) => return format!("Failed to send email: {e}"),
        };

        let transport = match SmtpTransport::starttls_relay(&self.config.smtp_server) {
            Ok(builder) => builder
                .port(self.config.smtp_port)
                .credentials(Credentials::new(
                    self.config.sender_email.clone(),
                    self.config.sender_password.clone(),
                ))
                .build(),
            Err(e) => return format!("Failed to send email: {e}"),
        };

        match transport.send(&message) {
            Ok(_) => {
                info!(to, "email sent");
                format!("Email successfully sent to {to}")
            }
            Err(e) => {
                warn!("email send failed: {e}");
                format!("Failed to send email: {e}")
            }
        }
    }
}

/// Template kind selected by substring match on the original command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Meeting request.
    Meeting,
    /// Thank-you note.
    ThankYou,
    /// Follow-up nudge.
    Followup,
    /// Generic professional message.
    Professional,
}

impl Template {
    /// Pick the template implied by a quick-email command.
    #[must_use]
    pub fn from_command(text: &str) -> Self {
        if text.contains("meeting") {
            Self::Meeting
        } else if text.contains("thank") {
            Self::ThankYou
        } else if text.contains("follow") {
            Self::Followup
        } else {
            Self::Professional
        }
    }

    /// Whether this template asks for a topic before rendering.
    #[must_use]
    pub fn wants_topic(self) -> bool {
        matches!(self, Self::Meeting | Self::ThankYou | Self::Followup)
    }

    /// Render the message body.
    #[must_use]
    pub fn body(self, name: &str, topic: &str, my_name: &str) -> String {
        match self {
            Self::Meeting => format!(
                "Hi {name},\n\nI'd like to schedule a meeting to discuss {topic}. \
                 Please let me know your availability.\n\nBest regards,\n{my_name}"
            ),
            Self::ThankYou => format!(
                "Dear {name},\n\nThank you for your help with {topic}. \
                 I really appreciate your support.\n\nSincerely,\n{my_name}"
            ),
            Self::Followup => format!(
                "Hi {name},\n\nJust following up on our previous conversation about {topic}. \
                 Looking forward to your response.\n\nBest,\n{my_name}"
            ),
            Self::Professional => format!(
                "Dear {name},\n\nI hope this email finds you well.\n\nBest regards,\n{my_name}"
            ),
        }
    }

    /// Derive the subject line.
    #[must_use]
    pub fn subject(self, name: &str, topic: &str) -> String {
        match self {
            Self::Meeting => {
                if topic.is_empty() {
                    "Meeting Request".to_owned()
                } else {
                    format!("Meeting about {topic}")
                }
            }
            Self::ThankYou => format!("Thank you {name}"),
            Self::Followup => {
                if topic.is_empty() {
                    "Follow up".to_owned()
                } else {
                    format!("Follow up: {topic}")
                }
            }
            Self::Professional => "Message".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn template_selection_by_substring() {
        assert_eq!(Template::from_command("send meeting email to bob"), Template::Meeting);
        assert_eq!(Template::from_command("send thank you email to bob"), Template::ThankYou);
        assert_eq!(Template::from_command("send followup to bob"), Template::Followup);
        assert_eq!(Template::from_command("send email to bob"), Template::Professional);
    }

    #[test]
    fn topic_requirement() {
        assert!(Template::Meeting.wants_topic());
        assert!(!Template::Professional.wants_topic());
    }

    #[test]
    fn subjects_include_topic_when_present() {
        assert_eq!(Template::Meeting.subject("bob", "budgets"), "Meeting about budgets");
        assert_eq!(Template::Meeting.subject("bob", ""), "Meeting Request");
        assert_eq!(Template::ThankYou.subject("bob", "x"), "Thank you bob");
        assert_eq!(Template::Followup.subject("bob", ""), "Follow up");
    }

    #[test]
    fn body_mentions_recipient_and_signer() {
        let body = Template::Meeting.body("Alice", "the launch", "Dana");
        assert!(body.contains("Hi Alice"));
        assert!(body.contains("the launch"));
        assert!(body.ends_with("Dana"));
    }

    #[test]
    fn unconfigured_sender_reports_without_touching_network() {
        let sender = SmtpSender::new(EmailConfig::default());
        let reply = sender.send("x@example.com", "s", "b");
        assert!(reply.contains("Email not configured"));
    }
}
