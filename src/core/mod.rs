pub mod error;
pub mod path;
pub mod process;

pub use error::{LauncherError, Result};
pub use path::{expand_vars, resolve_path};
pub use process::ProcessExecutor;
