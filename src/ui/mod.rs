pub mod desktop;
pub mod output;
pub mod progress;
pub mod shell;
pub mod signals;

pub use desktop::{profile_url, Launcher, SystemLauncher};
pub use output::{OutputFormatter, OutputMode};
pub use progress::ProgressManager;
pub use shell::{run_shell, ShellCommand};
pub use signals::GracefulShutdown;
