/// Error type for host-level operations.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// An admin tool exited non-zero.
    #[error("{program} exited with code {code:?}: {stderr}")]
    Command {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Spawning a tool or touching the filesystem failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mailing list inventory endpoint could not be reached.
    #[error("list inventory request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A tool produced output we could not make sense of.
    #[error("unexpected tool output: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_carries_stderr() {
        let err = SystemError::Command {
            program: "chpasswd".to_string(),
            code: Some(1),
            stderr: "permission denied".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("chpasswd"));
        assert!(text.contains("permission denied"));
    }
}
