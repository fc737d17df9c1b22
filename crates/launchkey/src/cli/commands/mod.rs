//! CLI commands

mod check;
mod gradle_args;
mod resolve;
mod signing_args;

pub use check::{CheckCommand, CheckFailed};
pub use gradle_args::GradleArgsCommand;
pub use resolve::ResolveCommand;
pub use signing_args::SigningArgs;
