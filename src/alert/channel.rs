use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::alert::report::ChangeReport;
use crate::config::MailerConfig;

/// Where a change report goes. Mail when the mailer is fully configured,
/// stdout otherwise; console delivery is a deliberate degraded mode, not an
/// error.
pub enum NotificationChannel {
    Console(ConsolePrinter),
    Mail(MailSender),
}

impl NotificationChannel {
    pub fn from_config(mailer: &MailerConfig) -> Result<Self> {
        if mailer.is_configured() {
            Ok(Self::Mail(MailSender::new(mailer)?))
        } else {
            warn!("mail credentials not set, changes will be written to stdout");
            Ok(Self::Console(ConsolePrinter))
        }
    }

    pub async fn deliver(&self, report: &ChangeReport) -> Result<()> {
        match self {
            Self::Console(printer) => printer.deliver(report),
            Self::Mail(sender) => sender.deliver(report).await,
        }
    }
}

pub struct ConsolePrinter;

impl ConsolePrinter {
    pub fn deliver(&self, report: &ChangeReport) -> Result<()> {
        println!("Changes detected:");
        print!("{}", report.render_text());
        Ok(())
    }
}

/// Sends the HTML report over an authenticated, implicitly-TLS SMTP
/// submission session to the single configured recipient.
pub struct MailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl MailSender {
    pub fn new(mailer: &MailerConfig) -> Result<Self> {
        let from: Mailbox = mailer
            .username
            .parse()
            .with_context(|| format!("invalid sender address: {}", mailer.username))?;
        let to: Mailbox = mailer
            .recipient
            .parse()
            .with_context(|| format!("invalid recipient address: {}", mailer.recipient))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&mailer.smtp_host)
            .with_context(|| format!("invalid SMTP relay host: {}", mailer.smtp_host))?
            .port(mailer.smtp_port)
            .credentials(Credentials::new(
                mailer.username.clone(),
                mailer.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            from,
            to,
        })
    }

    pub async fn deliver(&self, report: &ChangeReport) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(report.subject())
            .header(ContentType::TEXT_HTML)
            .body(report.render_html())
            .context("failed building alert email")?;
        self.transport
            .send(email)
            .await
            .context("failed sending alert email")?;
        info!("alert email sent to {}", self.to);
        Ok(())
    }
}
