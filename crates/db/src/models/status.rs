//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding table created by `migrations/0001_init.sql`.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Membership lifecycle status (`member_statuses` table).
    ///
    /// `New` is a signup application that has not been provisioned;
    /// `Cancelled` is the soft-deleted retirement state.
    MemberStatus {
        New = 1,
        Normal = 2,
        Cancelled = 3,
    }
}

define_status_enum! {
    /// Job lifecycle state (`job_states` table).
    ///
    /// `Unapproved` and `Queued` are the unstarted states; only they may
    /// move to `Withdrawn`. `Done`, `Failed`, and `Withdrawn` are
    /// terminal and never left.
    JobState {
        Unapproved = 1,
        Queued = 2,
        Running = 3,
        Done = 4,
        Failed = 5,
        Withdrawn = 6,
    }
}

define_status_enum! {
    /// Job log entry severity (`log_levels` table).
    LogLevel {
        Debug = 1,
        Info = 2,
        Warning = 3,
        Error = 4,
    }
}

impl JobState {
    /// Whether a job in this state has not yet been claimed by a runner.
    pub fn is_unstarted(self) -> bool {
        matches!(self, JobState::Unapproved | JobState::Queued)
    }

    /// Whether this state is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Withdrawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_status_ids_match_seed_data() {
        assert_eq!(MemberStatus::New.id(), 1);
        assert_eq!(MemberStatus::Normal.id(), 2);
        assert_eq!(MemberStatus::Cancelled.id(), 3);
    }

    #[test]
    fn job_state_ids_match_seed_data() {
        assert_eq!(JobState::Unapproved.id(), 1);
        assert_eq!(JobState::Queued.id(), 2);
        assert_eq!(JobState::Running.id(), 3);
        assert_eq!(JobState::Done.id(), 4);
        assert_eq!(JobState::Failed.id(), 5);
        assert_eq!(JobState::Withdrawn.id(), 6);
    }

    #[test]
    fn log_level_ids_match_seed_data() {
        assert_eq!(LogLevel::Debug.id(), 1);
        assert_eq!(LogLevel::Info.id(), 2);
        assert_eq!(LogLevel::Warning.id(), 3);
        assert_eq!(LogLevel::Error.id(), 4);
    }

    #[test]
    fn unstarted_and_terminal_partitions() {
        assert!(JobState::Unapproved.is_unstarted());
        assert!(JobState::Queued.is_unstarted());
        assert!(!JobState::Running.is_unstarted());
        assert!(!JobState::Done.is_unstarted());

        assert!(JobState::Done.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Withdrawn.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(!JobState::Queued.is_terminal());
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = MemberStatus::Normal.into();
        assert_eq!(id, 2);
    }
}
