//! Single-table key generation functions.
//!
//! Pure functions for generating partition and sort keys following the single-table design.
//! All functions are sync and have no side effects.
//!
//! | Entity           | PK                 | SK                            |
//! |------------------|--------------------|-------------------------------|
//! | UserMetadata     | `USER#<username>`  | `#METADATA`                   |
//! | EmailReservation | `USER#<email>`     | `#USER#<username>`            |
//! | EmailClaim       | `USER#<email>`     | `#EMAIL`                      |
//! | Workout          | `USER#<username>`  | `WORKOUT#<username>#<name>`   |
//!
//! Within a user partition `#` (0x23) sorts below every letter, so `#METADATA`
//! always comes before any `WORKOUT#...` sort key.

use crate::error::DataError;

// ============================================================================
// Key prefixes
// ============================================================================

pub const USER_PREFIX: &str = "USER#";
pub const METADATA_SK: &str = "#METADATA";
pub const EMAIL_RESERVATION_PREFIX: &str = "#USER#";
pub const EMAIL_CLAIM_SK: &str = "#EMAIL";
pub const WORKOUT_PREFIX: &str = "WORKOUT#";

/// Segment delimiter used inside composite keys.
pub const DELIMITER: char = '#';

/// Closes a per-user workout scan. `$` (0x24) sorts right above the `#`
/// that follows the username in every workout sort key.
pub const SCAN_SENTINEL: char = '$';

// ============================================================================
// User keys
// ============================================================================

/// Generate partition key for a user's metadata and workouts.
///
/// Pattern: `USER#<username>`
pub fn user_pk(username: &str) -> String {
    format!("{USER_PREFIX}{username}")
}

/// Sort key of the metadata row.
///
/// Pattern: `#METADATA`
pub fn metadata_sk() -> &'static str {
    METADATA_SK
}

/// Recover the username from a user partition key.
pub fn username_from_pk(pk: &str) -> Result<&str, DataError> {
    match pk.strip_prefix(USER_PREFIX) {
        Some(username) if !username.is_empty() => Ok(username),
        _ => Err(DataError::MalformedKey {
            key: pk.to_string(),
            reason: format!("expected `{USER_PREFIX}<username>`"),
        }),
    }
}

// ============================================================================
// Email reservation keys
// ============================================================================

/// Generate partition key for an email reservation.
///
/// Pattern: `USER#<email>`
pub fn email_pk(email: &str) -> String {
    format!("{USER_PREFIX}{email}")
}

/// Generate sort key for an email reservation.
///
/// Pattern: `#USER#<username>`
pub fn email_reservation_sk(username: &str) -> String {
    format!("{EMAIL_RESERVATION_PREFIX}{username}")
}

/// Sort key of the email claim row.
///
/// The reservation sort key embeds the username, so two usernames never
/// collide on it. The claim row has one fixed key per email and is what
/// makes an email unique.
///
/// Pattern: `#EMAIL`
pub fn email_claim_sk() -> &'static str {
    EMAIL_CLAIM_SK
}

// ============================================================================
// Workout keys
// ============================================================================

/// Generate sort key for a workout.
///
/// Pattern: `WORKOUT#<username>#<name>`
///
/// The name is appended verbatim and may itself contain `#`.
pub fn workout_sk(username: &str, name: &str) -> String {
    format!("{WORKOUT_PREFIX}{username}{DELIMITER}{name}")
}

/// Sort key prefix shared by every workout of a user.
///
/// Pattern: `WORKOUT#<username>#`
pub fn workout_sk_prefix(username: &str) -> String {
    format!("{WORKOUT_PREFIX}{username}{DELIMITER}")
}

/// Extract the workout name from a sort key produced by [`workout_sk`].
///
/// Strips the `WORKOUT` and `<username>` segments and returns the rest
/// verbatim, embedded delimiters included.
pub fn workout_name_from_sk<'a>(sk: &'a str, username: &str) -> Result<&'a str, DataError> {
    let name = sk
        .strip_prefix(WORKOUT_PREFIX)
        .and_then(|rest| rest.strip_prefix(username))
        .and_then(|rest| rest.strip_prefix(DELIMITER));

    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(DataError::MalformedKey {
            key: sk.to_string(),
            reason: format!("expected `{WORKOUT_PREFIX}{username}{DELIMITER}<name>`"),
        }),
    }
}

// ============================================================================
// Profile scan bounds
// ============================================================================

/// Inclusive lower bound of the combined metadata + workouts scan.
pub fn profile_scan_start() -> &'static str {
    METADATA_SK
}

/// Inclusive upper bound of the combined metadata + workouts scan.
///
/// Pattern: `WORKOUT#<username>$`
///
/// Any category prefix sorting between `#` and `W` also falls inside
/// `[#METADATA, WORKOUT#<username>$]`; readers must classify rows by prefix.
pub fn profile_scan_end(username: &str) -> String {
    format!("{WORKOUT_PREFIX}{username}{SCAN_SENTINEL}")
}
