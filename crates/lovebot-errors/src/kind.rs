#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    Transport,
    Storage,
    Payment,
    Handler,
    Config,
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "Transport",
            ErrorKind::Storage => "Storage",
            ErrorKind::Payment => "Payment",
            ErrorKind::Handler => "Handler",
            ErrorKind::Config => "Config",
            ErrorKind::Unknown => "Unknown",
        }
    }
}
