// Errors raised by the console host while reading or writing the explorer view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The first word of an input line is not a known shell command.
    UnknownCommand(String),
    /// A shell command was given without one of its arguments.
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    /// A node id that the shell is not currently displaying.
    UnknownNode(String),
    /// Writing to the output stream failed.
    Io(String),
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        PlatformError::Io(err.to_string())
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::UnknownCommand(s) => write!(f, "Unknown command: {s}"),
            PlatformError::MissingArgument { command, argument } => {
                write!(f, "Missing argument <{argument}> for '{command}'")
            }
            PlatformError::UnknownNode(s) => write!(f, "No datasource node '{s}' is shown"),
            PlatformError::Io(s) => write!(f, "I/O error: {s}"),
        }
    }
}

impl std::error::Error for PlatformError {}

/// A specialized `Result` type for platform layer operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
