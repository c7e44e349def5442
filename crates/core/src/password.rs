//! Generated account passwords.
//!
//! A [`Password`] exists only in transit: generated during a job run,
//! handed to a host tool or database cluster, included once in the
//! notification that delivers it, then dropped. It is never persisted
//! and never appears in logs -- `Debug` redacts the value and there is
//! no `Display` impl.

use rand::distr::{Alphanumeric, SampleString};

/// Length of generated passwords.
const GENERATED_LEN: usize = 16;

/// A cleartext account password in transit.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap an existing cleartext value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a random alphanumeric password.
    pub fn generate() -> Self {
        Self(Alphanumeric.sample_string(&mut rand::rng(), GENERATED_LEN))
    }

    /// The cleartext value, for host tools and notification bodies.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_passwords_are_alphanumeric() {
        let password = Password::generate();
        assert_eq!(password.reveal().len(), GENERATED_LEN);
        assert!(password.reveal().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_passwords_differ() {
        assert_ne!(Password::generate(), Password::generate());
    }

    #[test]
    fn debug_never_shows_the_value() {
        let password = Password::new("hunter2hunter2aa");
        assert_eq!(format!("{password:?}"), "Password(***)");
    }
}
