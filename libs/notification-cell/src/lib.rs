pub mod services;

pub use services::MailNotifier;
