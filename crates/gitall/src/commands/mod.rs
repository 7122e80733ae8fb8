//! One module per subcommand, plus the shared output context.

use termcolor::{ColorChoice, StandardStream};

/// `gitall clone`.
pub mod clone;
/// `gitall config`.
pub mod config;
/// `gitall fetch`.
pub mod fetch;
/// `gitall list`.
pub mod list;
/// `gitall pull`.
pub mod pull;
/// `gitall status`.
pub mod status;

/// Output settings shared by every command.
pub struct Context {
    /// Suppress progress and informational lines.
    pub quiet: bool,
    /// Emit JSON instead of human-readable output.
    pub json: bool,
    /// Color preference, already resolved against the terminal.
    pub color: ColorChoice,
}

impl Context {
    /// A stdout stream honouring the color preference.
    pub fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.color)
    }
}
