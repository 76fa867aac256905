use thiserror::Error;

/// Main error type for the rhythm-timeline library
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Output error: {0}")]
    Emit(#[from] EmitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while loading audio or extracting features from it
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio analysis failed: {reason}")]
    AnalysisFailed { reason: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Errors raised while writing the generated artifacts
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Failed to serialize timeline: {reason}")]
    SerializeFailed { reason: String },

    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using TimelineError
pub type Result<T> = std::result::Result<T, TimelineError>;

impl TimelineError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether this error happened before any analysis started
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Audio(AudioError::NotFound { .. }))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::NotFound { path }) => {
                format!("Audio file not found at '{}'", path)
            }
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not decode audio file '{}'", path)
            }
            Self::Audio(AudioError::UnsupportedFormat { format }) => {
                format!("Audio format '{}' is not supported", format)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }

    /// Remediation hints shown after the diagnostic
    pub fn hints(&self) -> Vec<&'static str> {
        match self {
            Self::Audio(AudioError::NotFound { .. }) => vec![
                "Make sure the file path is correct and the file exists.",
            ],
            Self::Audio(_) => vec![
                "Make sure the audio file format is supported (wav, mp3, flac, ogg, m4a).",
                "Re-encode the file to 16-bit PCM WAV if decoding keeps failing.",
            ],
            Self::Emit(_) | Self::Io(_) => vec![
                "Check that the output directory exists and is writable.",
            ],
            Self::Config(_) => vec![
                "Check the configuration file against `Config::default()` saved with `save_to_file`.",
            ],
            Self::Generic(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        let missing: TimelineError = AudioError::NotFound { path: "nope.mp3".into() }.into();
        assert!(missing.is_precondition());
        assert!(missing.user_message().contains("nope.mp3"));

        let decode: TimelineError = AudioError::LoadFailed { path: "bad.mp3".into() }.into();
        assert!(!decode.is_precondition());
        assert!(!decode.hints().is_empty());
    }

    #[test]
    fn test_emit_error_keeps_cause() {
        let err: TimelineError = EmitError::WriteFailed {
            path: "out/audio-analysis.js".into(),
            reason: "permission denied".into(),
        }
        .into();
        let message = err.user_message();
        assert!(message.contains("audio-analysis.js"));
        assert!(message.contains("permission denied"));
    }
}
