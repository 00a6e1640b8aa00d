//! Hub error types

/// Error type for broadcast hub operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The inbound queue has been torn down and no longer accepts messages
    Closed,
    /// The sender loop has already been started; the queue has exactly one consumer
    SenderLoopAlreadyRunning,
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::Closed => write!(f, "Inbound queue is closed"),
            HubError::SenderLoopAlreadyRunning => {
                write!(f, "Sender loop is already running")
            }
        }
    }
}

impl std::error::Error for HubError {}
