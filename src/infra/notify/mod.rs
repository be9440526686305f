pub mod http_reminder_notifier;
