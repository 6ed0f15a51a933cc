use serde::{Deserialize, Serialize};

/// Returns the current Unix timestamp in seconds, the unit of every `iat` field.
pub fn current_iat() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Where a user lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    /// Short form state, e.g. `CA`, `ON`, `NY`.
    pub state: String,
    /// Short form country, e.g. `USA`, `CA`, `FR`.
    pub country: String,
}

impl Location {
    pub fn new(
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }
}

/// One entry of a user's login history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRecord {
    pub iat: i64,
    pub ip: String,
}

/// Everything needed to register a user. Values arrive already validated and
/// the password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub location: Location,
    pub hash: String,
    pub salt: String,
    pub source_ip: String,
    pub iat: i64,
}

impl NewUser {
    /// Builds the metadata record written at signup: empty picture and bio,
    /// login history seeded with the signup request.
    pub fn to_metadata(&self) -> UserMetadata {
        UserMetadata {
            username: self.username.clone(),
            email: self.email.clone(),
            hash: self.hash.clone(),
            salt: self.salt.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile_picture: String::new(),
            bio: String::new(),
            location: self.location.clone(),
            ips: vec![LoginRecord {
                iat: self.iat,
                ip: self.source_ip.clone(),
            }],
        }
    }
}

/// The metadata row of a user.
///
/// Serializes to the `user` attribute map of the row. The username is not
/// part of that map: it is always taken from the partition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(skip)]
    pub username: String,
    pub email: String,
    pub hash: String,
    pub salt: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub bio: String,
    pub location: Location,
    #[serde(default)]
    pub ips: Vec<LoginRecord>,
}

impl UserMetadata {
    /// The public projection returned to the user on login (no credentials).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile_picture: self.profile_picture.clone(),
            bio: self.bio.clone(),
            location: self.location.clone(),
        }
    }
}

/// User metadata without credentials or login history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: String,
    pub bio: String,
    pub location: Location,
}
