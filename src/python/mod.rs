//! Python runtime discovery and virtual-environment management.
//!
//! Everything the bootstrapper provisions lives here: interpreter
//! resolution from PATH, the [`VirtualEnv`] handle, and the pip driver
//! with the fixed workflow package set.

pub mod interpreter;
pub mod pip;
pub mod venv;

pub use interpreter::{find_interpreter, Interpreter};
pub use pip::{Pip, PackageSpec, PACKAGES};
pub use venv::VirtualEnv;
