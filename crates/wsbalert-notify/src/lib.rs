//! Email delivery for the daily signal report.

pub mod error;
pub mod mailer;

pub use error::NotifyError;
pub use mailer::{Delivery, SmtpNotifier};
