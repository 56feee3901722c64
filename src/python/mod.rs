pub mod activation;
pub mod executor;

pub use activation::{ActivationOutcome, ActivationScript, VenvActivator};
pub use executor::{exit_code_of, EntryPointExecutor};
