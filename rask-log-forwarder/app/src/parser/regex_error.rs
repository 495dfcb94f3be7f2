// Regex error handling for memory-safe and compile-time validated patterns
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RegexError {
    #[error("Regex compilation failed for pattern '{pattern}' (name: {name}): {source}")]
    CompilationFailed {
        pattern: String,
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Regex index out of bounds: {index} >= {max}")]
    IndexOutOfBounds { index: usize, max: usize },

    #[error("Regex pattern not found: {name}")]
    PatternNotFound { name: String },

    #[error("Regex execution failed: {details}")]
    ExecutionFailed { details: String },
}

impl RegexError {
    /// Runtime fallback strategy for regex failures
    pub fn fallback_strategy(&self) -> FallbackStrategy {
        match self {
            RegexError::CompilationFailed { .. } => FallbackStrategy::UseSimpleParser,
            RegexError::IndexOutOfBounds { .. } => FallbackStrategy::UseDefaultPattern,
            RegexError::PatternNotFound { .. } => FallbackStrategy::UseDefaultPattern,
            RegexError::ExecutionFailed { .. } => FallbackStrategy::SkipEntry,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackStrategy {
    UseSimpleParser,
    UseDefaultPattern,
    SkipEntry,
}
