//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Authentication,
    Transport,
    Protocol,
    EmptyResponse,
    Capture,
    Storage,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    CheckConfiguration,
    CheckCredentials,
    CheckInput,
    CheckNetwork,
    ContactProvider,
    SelectText,
    CheckConfigFile,
}
