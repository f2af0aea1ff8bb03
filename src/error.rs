//! Application error type.
//!
//! Every failure in the pipeline is fatal, so one error type carrying the
//! process exit code is enough:
//!
//! - `2`: schema or input file problems (missing file, bad header, bad token)
//! - `3`: not enough data to fit the imputation model
//! - `4`: internal failures and output writes

#[derive(Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Malformed or missing input.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Failure reading an input file.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// The imputation model could not be fit.
    pub fn imputation(message: impl Into<String>) -> Self {
        Self::new(3, format!("Insufficient data for imputation: {}", message.into()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}
