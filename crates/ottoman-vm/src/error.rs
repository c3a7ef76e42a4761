use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum VmError {
    /// The interpreter could not be created.
    Init(String),
    /// Source text did not compile to a function.
    Compile(String),
    /// Script code raised an error while running.
    Runtime(String),
    /// A value could not cross the host/script boundary.
    Conversion(String),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "runtime init failed: {msg}"),
            Self::Compile(msg) => write!(f, "compile error: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::Conversion(msg) => write!(f, "conversion error: {msg}"),
        }
    }
}

impl std::error::Error for VmError {}

/// Error returned by a host callback. Raised inside the script as a runtime
/// error, so it unwinds the running function.
#[derive(Debug, Clone, PartialEq)]
pub struct HostError(pub String);

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HostError {}

impl From<String> for HostError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

impl From<&str> for HostError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}
