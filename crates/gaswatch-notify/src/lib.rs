pub mod message;
pub mod notifier;
pub mod providers;

pub use message::{NotifyLevel, NotifyMessage};
pub use notifier::{Notifier, NotifyError, NotifyResult};
pub use providers::{EmailConfig, EmailNotifier, LogNotifier, WebhookConfig, WebhookNotifier};
