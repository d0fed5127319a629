//! Small shared utilities: secrets hygiene and time conversion.

pub mod secret_string;
pub mod time;

pub use secret_string::SecretString;
pub use time::{from_unix_timestamp, to_unix_timestamp, unix_now};
