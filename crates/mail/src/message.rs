//! Rendered notification values.

/// The sysadmins contact, copied on audit notices and addressed directly
/// by approval requests.
pub const SYSADMINS_NAME: &str = "SCF Sysadmins";
pub const SYSADMINS_ADDRESS: &str = "sysadmins@scf.net";

/// One addressee of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

impl Recipient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// The sysadmins contact as a recipient.
    pub fn sysadmins() -> Self {
        Self::new(SYSADMINS_NAME, SYSADMINS_ADDRESS)
    }
}

/// A rendered notification ready for delivery.
///
/// The subject carries no facility prefix; the notifier prepends it at
/// send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub to: Vec<Recipient>,
    pub subject: String,
    pub body: String,
    /// Copy the sysadmins on delivery (audit notices).
    pub copy_sysadmins: bool,
}

impl Outgoing {
    pub fn new(to: Vec<Recipient>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            body: body.into(),
            copy_sysadmins: false,
        }
    }

    /// Mark this notification to be copied to the sysadmins.
    pub fn with_sysadmins_copy(mut self) -> Self {
        self.copy_sysadmins = true;
        self
    }
}
