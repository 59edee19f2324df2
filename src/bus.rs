/// Which message bus a run targets. Fixed at startup; every backend invocation
/// for the run addresses the same bus.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BusType {
    /// The system-wide bus (default).
    #[default]
    System,
    /// The per-login-session bus.
    Session,
}

impl BusType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Session => "session",
        }
    }
}

impl std::fmt::Display for BusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
