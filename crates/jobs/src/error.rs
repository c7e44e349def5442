/// Error type for job submission and execution.
///
/// `Precondition` is the one variant with its own terminal semantics:
/// the run stops before any effect, the job is closed with the message,
/// and operators get a distinct exit status. Everything else is an
/// effect failure and marks the job `failed` with the causing error.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The subject is already in a conflicting state.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Arguments rejected at submission, or a stored args payload that
    /// no longer parses.
    #[error("invalid job arguments: {0}")]
    BadArgs(String),

    /// A job row whose kind string this build does not know.
    #[error("unknown job kind: {0:?}")]
    UnknownKind(String),

    /// A guarded transition did not match, meaning the rows changed
    /// under us mid-run.
    #[error("state conflict: {0}")]
    State(String),

    /// The job needs an external service this deployment does not have
    /// configured, e.g. a database cluster with no admin URL set.
    #[error("required service unavailable: {0}")]
    Unavailable(String),

    /// Membership database failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Host tool or directory failure.
    #[error(transparent)]
    System(#[from] scf_system::SystemError),

    /// Cluster provisioning failure.
    #[error(transparent)]
    Provision(#[from] scf_provision::ProvisionError),
}

impl JobError {
    /// Whether this error is a precondition violation rather than an
    /// effect failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, JobError::Precondition(_))
    }
}
