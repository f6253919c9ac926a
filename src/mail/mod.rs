mod message;
mod send;

pub use message::{EmailMessage, compose_with_images};
pub use send::{MailTransport, RestMailTransport};
