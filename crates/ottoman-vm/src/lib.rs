//! Script execution for view functions.
//!
//! The [`Runtime`] trait is the only surface the view engine sees: compile a
//! source text into a callable, bind globals, register host callbacks, call.
//! [`LuaRuntime`] implements it on an embedded Lua 5.4 interpreter.

mod config;
mod error;
#[cfg(feature = "lua")]
mod lua;
mod runtime;

pub use config::{LibSet, RuntimeConfig};
pub use error::{HostError, VmError};
#[cfg(feature = "lua")]
pub use lua::LuaRuntime;
pub use runtime::{HostResult, Runtime};
