use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;

/// SMTP client for the invitation mail. Built per send from environment
/// settings; with `SMTP_SKIP_SEND=true` every send is a silent no-op so local
/// setups work without a mail server.
pub struct EmailService {
    mailer: SmtpTransport,
    from_address: String,
}

fn sending_disabled() -> bool {
    env::var("SMTP_SKIP_SEND").unwrap_or_default() == "true"
}

impl EmailService {
    pub fn new() -> Result<Self> {
        let host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(587);
        let username = env::var("SMTP_USERNAME").unwrap_or_default();
        let password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| "noreply@coachlog.local".to_string());

        // Unauthenticated transport is for local development only.
        let mailer = if username.is_empty() {
            SmtpTransport::builder_dangerous(&host).port(port).build()
        } else {
            SmtpTransport::relay(&host)?
                .port(port)
                .credentials(Credentials::new(username, password))
                .build()
        };

        Ok(Self {
            mailer,
            from_address,
        })
    }

    pub fn send_invitation_email(
        &self,
        to_email: &str,
        invite_link: &str,
        expiry_days: i64,
    ) -> Result<()> {
        if sending_disabled() {
            return Ok(());
        }

        let body = format!(
            "You have been invited to join coachlog as a job coach.\n\n\
             Use the link below to set up your account:\n\n\
             {}\n\n\
             The link is valid for {} days and can be used once. If you were\n\
             not expecting this invitation, you can ignore this email.\n\n\
             ---\n\
             coachlog field reporting\n",
            invite_link, expiry_days
        );

        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject("Your coachlog account invitation")
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(&email)?;
        Ok(())
    }
}
