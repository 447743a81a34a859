pub mod channel;
pub mod report;

pub use channel::{ConsolePrinter, MailSender, NotificationChannel};
pub use report::ChangeReport;
