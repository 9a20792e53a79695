use thiserror::Error;

/// Result type for getset operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the getset compiler
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error on line {line}: {message}")]
    Syntax {
        line: usize,
        message: String,
    },

    #[error("Type not resolved on line {line}: {expr}")]
    UnresolvedType {
        line: usize,
        expr: String,
    },

    #[error("Primitive type '{expr}' cannot be used as a type argument (line {line})")]
    PrimitiveTypeArgument {
        line: usize,
        expr: String,
    },

    #[error("Unexpected end of file after line {line}")]
    UnexpectedEndOfInput { line: usize },

    #[error("Error compiling binary class: {message}")]
    Encoding { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a syntax error with location information
    pub fn syntax_error(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Create an unresolved type error; the line is attached later by the caller
    pub fn unresolved_type(expr: impl Into<String>) -> Self {
        Self::UnresolvedType {
            line: 0,
            expr: expr.into(),
        }
    }

    /// Create a primitive type argument error; the line is attached later by the caller
    pub fn primitive_type_argument(expr: impl Into<String>) -> Self {
        Self::PrimitiveTypeArgument {
            line: 0,
            expr: expr.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::Encoding { message: message.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Attach a source line to errors raised below the parser.
    ///
    /// Errors that already carry a line, or have no notion of one, are returned unchanged.
    pub fn at_line(self, source_line: usize) -> Self {
        match self {
            Self::Syntax { line: 0, message } => Self::Syntax { line: source_line, message },
            Self::UnresolvedType { line: 0, expr } => Self::UnresolvedType { line: source_line, expr },
            Self::PrimitiveTypeArgument { line: 0, expr } => {
                Self::PrimitiveTypeArgument { line: source_line, expr }
            }
            other => other,
        }
    }

    /// Source line this error points at, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::UnresolvedType { line, .. }
            | Self::PrimitiveTypeArgument { line, .. }
            | Self::UnexpectedEndOfInput { line } if *line > 0 => Some(*line),
            _ => None,
        }
    }
}

impl From<crate::codegen::error::EncodeError> for Error {
    fn from(err: crate::codegen::error::EncodeError) -> Self {
        Self::Encoding { message: err.to_string() }
    }
}

impl From<crate::verify::VerifyError> for Error {
    fn from(err: crate::verify::VerifyError) -> Self {
        Self::Encoding { message: format!("class file verify failed: {}", err) }
    }
}
