//! Shared plain-text layout for notification bodies.

/// Prefix the notifier applies to every subject line.
pub const SUBJECT_PREFIX: &str = "[SCF]";

/// Signature appended to every body.
const SIGNATURE: &str = "Kind regards,\n\nThe SCF Sysadmins\nsupport@scf.net";

/// Prefix a subject line for delivery.
pub fn subject(line: &str) -> String {
    format!("{SUBJECT_PREFIX} {line}")
}

/// Wrap a body in the standard salutation and signature.
pub fn wrap(recipient_name: &str, body: &str) -> String {
    format!("Dear {recipient_name},\n\n{body}\n\n{SIGNATURE}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_is_prefixed() {
        assert_eq!(subject("Welcome"), "[SCF] Welcome");
    }

    #[test]
    fn wrap_addresses_the_recipient() {
        let body = wrap("Ada", "Your account is ready.");
        assert!(body.starts_with("Dear Ada,\n\n"));
        assert!(body.contains("Your account is ready."));
        assert!(body.ends_with("support@scf.net\n"));
    }
}
