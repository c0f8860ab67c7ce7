use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("chain loop already started")]
    AlreadyStarted,
    #[error("chain loop must be started from within a tokio runtime")]
    NoRuntime,
}
