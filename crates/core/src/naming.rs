//! Account naming rules.
//!
//! Validation for the identifiers operators hand us: personal crsids,
//! society short names, and mailing-list suffixes. Anything rejected
//! here never reaches a host command or a SQL identifier.

use std::sync::LazyLock;

use regex::Regex;

/// University-issued crsids: lowercase letters followed by digits.
static CRSID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,10}[0-9]{1,6}$").expect("valid regex"));

/// Society short names: lowercase, starts with a letter, dashes and
/// underscores allowed inside, 2-16 characters total.
static SOCIETY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]{1,15}$").expect("valid regex"));

/// Mailing-list suffixes: the part after `owner-` in `owner-suffix`.
static LIST_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,31}$").expect("valid regex"));

/// Custom domains: two or more dot-separated labels of letters, digits
/// and inner hyphens.
static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$").expect("valid regex")
});

/// Suffixes the list server claims for every list it hosts. A list
/// named `owner-admin` would shadow the admin address of `owner`, so
/// these are rejected outright.
pub const RESERVED_LIST_SUFFIXES: [&str; 9] = [
    "admin",
    "bounces",
    "confirm",
    "join",
    "leave",
    "owner",
    "request",
    "subscribe",
    "unsubscribe",
];

/// Whether `s` is a well-formed crsid.
///
/// # Examples
///
/// ```
/// use scf_core::naming::is_crsid;
///
/// assert!(is_crsid("ab123"));
/// assert!(!is_crsid("AB123"));
/// assert!(!is_crsid("123ab"));
/// ```
pub fn is_crsid(s: &str) -> bool {
    CRSID_RE.is_match(s)
}

/// Whether `s` is a well-formed society short name.
pub fn is_society_name(s: &str) -> bool {
    SOCIETY_RE.is_match(s)
}

/// Whether `suffix` may be used for a new mailing list.
///
/// Rejects malformed suffixes and the reserved set the list server
/// generates itself.
pub fn is_list_suffix(suffix: &str) -> bool {
    LIST_SUFFIX_RE.is_match(suffix) && !RESERVED_LIST_SUFFIXES.contains(&suffix)
}

/// Whether `s` is a plausible custom domain name.
///
/// This gates character set and shape only; whether the submitter may
/// serve the domain is a human decision, not a syntactic one.
pub fn is_hostname(s: &str) -> bool {
    s.len() <= 253 && HOSTNAME_RE.is_match(s)
}

/// Map an account name to its MySQL username.
///
/// MySQL disallows `-` in unquoted usernames, so dashes become
/// underscores. Collisions are impossible because account names cannot
/// contain both forms of a name.
///
/// # Examples
///
/// ```
/// use scf_core::naming::mysql_username;
///
/// assert_eq!(mysql_username("chess-soc"), "chess_soc");
/// assert_eq!(mysql_username("ab123"), "ab123");
/// ```
pub fn mysql_username(account: &str) -> String {
    account.replace('-', "_")
}
