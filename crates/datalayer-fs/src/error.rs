use thiserror::Error;

/// Outcome of a filesystem operation that did not succeed.
#[derive(Debug, Error)]
pub enum FsError {
    /// The path does not name an existing store or key.
    #[error("no such store or key")]
    NotFound,

    /// The node call failed or returned an unexpected payload.
    #[error("remote store failure: {0}")]
    Remote(#[from] datalayer_rpc::Error),

    /// The node did not answer within the configured timeout.
    #[error("remote store did not answer within {0:?}")]
    TimedOut(std::time::Duration),

    /// The caller asked for write access to a read-only mount.
    #[error("filesystem is read-only")]
    PermissionDenied,
}

impl FsError {
    /// The errno reported to the kernel for this error.
    pub fn errno(&self) -> libc::c_int {
        match self {
            FsError::NotFound => libc::ENOENT,
            FsError::Remote(_) | FsError::TimedOut(_) => libc::EIO,
            FsError::PermissionDenied => libc::EACCES,
        }
    }

    /// Whether this error came from talking to the node rather than from the path.
    pub fn is_remote(&self) -> bool {
        matches!(self, FsError::Remote(_) | FsError::TimedOut(_))
    }
}

/// Result type for datalayer-fs operations.
pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn errno_mapping() {
        assert_eq!(FsError::NotFound.errno(), libc::ENOENT);
        assert_eq!(FsError::TimedOut(Duration::from_secs(1)).errno(), libc::EIO);
        assert_eq!(FsError::PermissionDenied.errno(), libc::EACCES);
        let remote = FsError::from(datalayer_rpc::Error::Config("x".into()));
        assert_eq!(remote.errno(), libc::EIO);
        assert!(remote.is_remote());
        assert!(!FsError::NotFound.is_remote());
    }
}
