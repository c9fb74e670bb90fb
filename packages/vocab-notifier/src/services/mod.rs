pub mod clock;
pub mod formatter;
pub mod notifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use formatter::MessageFormatter;
pub use notifier::{DiscordWebhook, Notifier, NotifyFailure, NotifyOutcome};
