/// Failure category of a run.
///
/// Every kind is fatal; the kind decides the process exit code and which
/// pipeline stage is named in the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Load,
    Parse,
    EmptyTable,
    DegenerateRange,
    Export,
    Terminal,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Load => "LoadError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::EmptyTable => "EmptyTableError",
            ErrorKind::DegenerateRange => "DegenerateRangeError",
            ErrorKind::Export => "ExportError",
            ErrorKind::Terminal => "TerminalError",
        }
    }

    pub fn stage(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Load => "load",
            ErrorKind::Parse => "clean",
            ErrorKind::EmptyTable => "aggregate",
            ErrorKind::DegenerateRange => "transform",
            ErrorKind::Export => "export",
            ErrorKind::Terminal => "tui",
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Load => 3,
            ErrorKind::Parse => 4,
            ErrorKind::EmptyTable => 5,
            ErrorKind::DegenerateRange => 6,
            ErrorKind::Export => 7,
            ErrorKind::Terminal => 8,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn empty_table(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyTable, message)
    }

    pub fn degenerate_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DegenerateRange, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Export, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} stage): {}",
            self.kind.name(),
            self.kind.stage(),
            self.message
        )
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_kind_and_stage() {
        let err = AppError::parse("Invalid date 'x' on line 3.");
        assert_eq!(
            err.to_string(),
            "ParseError (clean stage): Invalid date 'x' on line 3."
        );
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn exit_codes_are_distinct() {
        let kinds = [
            ErrorKind::Config,
            ErrorKind::Load,
            ErrorKind::Parse,
            ErrorKind::EmptyTable,
            ErrorKind::DegenerateRange,
            ErrorKind::Export,
            ErrorKind::Terminal,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
    }
}
