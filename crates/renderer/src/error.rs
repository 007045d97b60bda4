use std::fmt;

use thiserror::Error;

/// Pipeline stage a diagnostic originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Link,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
            ShaderStage::Link => f.write_str("link"),
        }
    }
}

/// Structured result of a failed compile or link.
///
/// Diagnostics are reported to the observer and transition the surface into
/// an error state; they never abort the process.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{stage} stage failed: {message}")]
pub struct CompileDiagnostic {
    pub stage: ShaderStage,
    pub message: String,
}

impl CompileDiagnostic {
    pub(crate) fn new(stage: ShaderStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Failure retrieving shader source text from a provider.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("shader source '{0}' was not found")]
    NotFound(String),
    #[error("reading shader source '{reference}' failed: {message}")]
    Io { reference: String, message: String },
    #[error("request for shader source '{reference}' failed: {message}")]
    Network { reference: String, message: String },
    #[error("server returned status {status} for shader source '{reference}'")]
    Status { reference: String, status: u16 },
}

/// Everything the lifecycle manager can report through `on_error`.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Compile(#[from] CompileDiagnostic),
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("GPU resource creation failed: {0}")]
    ResourceCreation(String),
}

impl SurfaceError {
    /// Fatal errors leave the surface unable to render until a fresh
    /// `load_shader` succeeds; recoverable ones keep the previous program on
    /// screen.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SurfaceError::ContextUnavailable(_) | SurfaceError::ResourceCreation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_diagnostics_are_recoverable() {
        let error = SurfaceError::Compile(CompileDiagnostic::new(
            ShaderStage::Fragment,
            "unexpected token",
        ));
        assert!(!error.is_fatal());
    }

    #[test]
    fn fetch_errors_are_recoverable() {
        let error = SurfaceError::Fetch(FetchError::NotFound("shaders/missing.frag".into()));
        assert!(!error.is_fatal());
    }

    #[test]
    fn context_loss_is_fatal() {
        assert!(SurfaceError::ContextUnavailable("no adapter".into()).is_fatal());
        assert!(SurfaceError::ResourceCreation("buffer allocation".into()).is_fatal());
    }

    #[test]
    fn diagnostic_names_its_stage() {
        let diagnostic = CompileDiagnostic::new(ShaderStage::Link, "entry point mismatch");
        assert_eq!(
            diagnostic.to_string(),
            "link stage failed: entry point mismatch"
        );
    }
}
