use serde_json::Value;

use crate::config::RuntimeConfig;
use crate::error::{HostError, VmError};

pub type HostResult = Result<Value, HostError>;

/// An isolated script environment.
///
/// Each instance owns its own globals. Callers create one per evaluation and
/// must not run two scripts in the same instance concurrently; nothing here
/// is `Sync`.
pub trait Runtime: Sized {
    /// A compiled, callable function.
    type Function;

    fn create(config: &RuntimeConfig) -> Result<Self, VmError>;

    /// Compile `source` into a function taking `params`.
    ///
    /// `name` labels the chunk in error messages.
    fn compile(
        &self,
        name: &str,
        source: &str,
        params: &[&str],
    ) -> Result<Self::Function, VmError>;

    /// Bind a global variable.
    fn bind(&self, name: &str, value: &Value) -> Result<(), VmError>;

    /// Expose a host callback as a global function. Arguments arrive in call
    /// order; trailing arguments the script omitted are absent, not null.
    fn register<F>(&self, name: &str, callback: F) -> Result<(), VmError>
    where
        F: Fn(Vec<Value>) -> HostResult + 'static;

    /// Call a compiled function and convert its first result back to JSON.
    fn call(&self, function: &Self::Function, args: &[Value]) -> Result<Value, VmError>;

    /// Run a compiled function for its side effects, discarding whatever it
    /// returns. Only a failure to convert `args` yields
    /// [`VmError::Conversion`].
    fn exec(&self, function: &Self::Function, args: &[Value]) -> Result<(), VmError>;
}
