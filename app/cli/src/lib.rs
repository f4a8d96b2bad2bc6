//! Switchboard CLI application: config loading, team construction, and
//! the chat, send and agents commands.

pub use cmd::{Cli, Command};

pub mod cmd;
pub mod config;
pub mod team;
pub mod utils;
