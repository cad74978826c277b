/*
 * The host side of the explorer. `types` defines the events and commands
 * exchanged with the explorer logic; `console_shell` is a text host that
 * parses user input into events and draws the commands it receives.
 */
pub mod console_shell;
pub mod error;
pub mod types;

pub use console_shell::{ConsoleShell, ShellInput};
pub use error::Result as PlatformResult;
pub use types::{AppEvent, EntityDescriptor, PlatformCommand, PlatformEventHandler};
