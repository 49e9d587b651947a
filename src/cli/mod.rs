/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;
mod shell;

pub use args::{Cli, Commands, EventCommands, EventFields, EventUpdate};
pub use commands::{handle_command, run_init};
pub use shell::ConsoleShell;
