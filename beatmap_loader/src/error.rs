use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    Parse,
    IO,
    Validation,
}

impl LoadErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            // Parse
            "E1001" | "E1002" | "E1003" | "E1011" | "E1012" | "E1013" => Self::Parse,

            // IO
            "E2001" | "E2002" => Self::IO,

            // Validation
            "E4001" | "E4002" | "E4003" => Self::Validation,

            _ => Self::Parse,
        }
    }
}

/// Failure while reading a beatmap or score file. `line` is 1-based, 0 when not tied to a line.
#[derive(Debug, Error, Clone)]
#[error("{code}: {message} (line {line})")]
pub struct LoadError {
    pub code: &'static str,
    pub kind: LoadErrorKind,
    pub message: String,
    pub line: usize,

    pub file: Option<String>,
    pub lane: Option<usize>,
    /// Trimmed text of the offending source line.
    pub context: Option<String>,
}

impl LoadError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>, line: usize) -> Self {
        Self {
            code,
            kind: LoadErrorKind::from_code(code),
            message: message.into(),
            line,

            file: None,
            lane: None,
            context: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_lane(mut self, lane: usize) -> Self {
        self.lane = Some(lane);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
