pub mod handlers;

pub use handlers::{handle, Command, CommandResponse};
