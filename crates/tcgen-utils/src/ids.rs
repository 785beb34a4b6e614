//! Identifier minting and normalization
//!
//! Requirement, test-case, and validation ids share one shape: a fixed
//! prefix plus a slice of an uppercase hex UUID. Test-case ids additionally
//! round-trip through Java class names (`TC-0A1B2C` ⇄ `TC_0A1B2CTest`);
//! because minted ids never contain underscores, and ids accepted from
//! generator output are sanitized to hyphens, that mapping is a bijection
//! over every id the system persists.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Shape of a minted requirement id.
pub static REQ_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^REQ-[0-9A-F]{8}$").expect("valid regex"));

/// Shape of a minted test-case id (generator-supplied ids may differ).
pub static TEST_CASE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^TC-[0-9A-F]{6}$").expect("valid regex"));

fn hex_token(len: usize) -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    hex[..len].to_string()
}

/// Mint a requirement id: `REQ-` + 8 uppercase hex chars.
#[must_use]
pub fn new_req_id() -> String {
    format!("REQ-{}", hex_token(8))
}

/// Mint a test-case id: `TC-` + 6 uppercase hex chars.
#[must_use]
pub fn new_test_case_id() -> String {
    format!("TC-{}", hex_token(6))
}

/// Mint a compliance-finding id: `VAL-` + 8 uppercase hex chars.
#[must_use]
pub fn new_validation_id() -> String {
    format!("VAL-{}", hex_token(8))
}

/// Sanitize a test-case id taken from generator output.
///
/// Underscores are replaced with hyphens so the id ⇄ class-name mapping
/// stays invertible; surrounding whitespace is dropped. An empty id after
/// trimming yields a freshly minted one.
#[must_use]
pub fn sanitize_test_case_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return new_test_case_id();
    }
    trimmed.replace('_', "-")
}

/// Derive the Java test class name for a test-case id: `-` becomes `_` and
/// a `Test` suffix is appended.
#[must_use]
pub fn junit_class_name(test_case_id: &str) -> String {
    format!("{}Test", test_case_id.replace('-', "_"))
}

/// Invert [`junit_class_name`] for a reported fully-qualified class name:
/// take the last dotted segment, strip one trailing `Test` suffix, and map
/// `_` back to `-`.
#[must_use]
pub fn test_case_id_from_class(classname: &str) -> String {
    let simple = classname.rsplit('.').next().unwrap_or(classname);
    let stem = simple.strip_suffix("Test").unwrap_or(simple);
    stem.replace('_', "-")
}
