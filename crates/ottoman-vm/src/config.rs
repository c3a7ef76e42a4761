const LIBS_ENV: &str = "OTTOMAN_VM_LIBS";

/// Standard libraries opened in a fresh runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibSet {
    /// Every memory-safe standard library.
    #[default]
    Safe,
    /// `string`, `table` and `math` only.
    Minimal,
}

impl LibSet {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Some(Self::Safe),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub libs: LibSet,
}

impl RuntimeConfig {
    /// Read overrides from the environment. Unknown values fall back to the
    /// default.
    pub fn from_env() -> Self {
        let libs = std::env::var(LIBS_ENV)
            .ok()
            .and_then(|s| LibSet::parse(&s))
            .unwrap_or_default();
        Self { libs }
    }
}
