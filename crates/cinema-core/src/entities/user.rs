//! User entity - one person across every identity channel

use chrono::{DateTime, Utc};
use std::fmt;

use crate::entities::{Credential, IdentityCandidate, Role};
use crate::value_objects::UserId;

/// User entity.
///
/// `phone_number`, `email` and `external_id` are each unique across users
/// when present. `is_verified` is monotonic: no merge ever clears it.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub external_id: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unsaved user; the store assigns `id` on insert
    pub fn new(name: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::default(),
            name,
            phone_number: None,
            email: None,
            password_hash: None,
            external_id: None,
            role,
            is_verified: role.is_trusted(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the row for a candidate that matched nobody.
    ///
    /// `hashed_plaintext` is the hash of the candidate's plaintext password,
    /// if it had one. Admin and staff start verified.
    pub fn from_candidate(
        candidate: &IdentityCandidate,
        role: Role,
        hashed_plaintext: Option<String>,
    ) -> Self {
        let mut user = Self::new(candidate.name().unwrap_or_default().to_string(), role);
        user.phone_number = candidate.phone_number().map(ToString::to_string);
        user.email = candidate.email().map(ToString::to_string);
        user.external_id = candidate.external_id().map(ToString::to_string);
        user.password_hash = match candidate.credential() {
            Some(Credential::Hashed(hash)) => Some(hash.clone()),
            Some(Credential::Plaintext(_)) => hashed_plaintext,
            None => None,
        };
        user.is_verified = user.is_verified || candidate.is_verified();
        user
    }

    /// Merge a candidate into this user without destroying anything.
    ///
    /// - `name` is replaced by a non-empty candidate name
    /// - `email`, `phone_number`, `external_id` are first-write-wins
    /// - an already-hashed credential replaces the stored hash; a plaintext one
    ///   only fills an empty slot (via `hashed_plaintext`)
    /// - `is_verified` is OR'd
    ///
    /// The role is left alone. Returns whether anything changed.
    pub fn merge_from(
        &mut self,
        candidate: &IdentityCandidate,
        hashed_plaintext: Option<String>,
    ) -> bool {
        let before = self.clone();

        if let Some(name) = candidate.name() {
            self.name = name.to_string();
        }
        fill_if_empty(&mut self.email, candidate.email());
        fill_if_empty(&mut self.phone_number, candidate.phone_number());
        fill_if_empty(&mut self.external_id, candidate.external_id());

        match candidate.credential() {
            Some(Credential::Hashed(hash)) => self.password_hash = Some(hash.clone()),
            Some(Credential::Plaintext(_)) if self.password_hash.is_none() => {
                self.password_hash = hashed_plaintext;
            }
            _ => {}
        }

        self.is_verified |= candidate.is_verified();

        let changed = *self != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Bind a phone number that just passed OTP verification
    pub fn bind_verified_phone(&mut self, phone: &str) {
        self.phone_number = Some(phone.to_string());
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    #[inline]
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Customers must verify a phone number before they are fully onboarded
    #[inline]
    pub fn needs_phone_verification(&self) -> bool {
        !self.is_verified
    }
}

fn fill_if_empty(slot: &mut Option<String>, incoming: Option<&str>) {
    if slot.is_none() {
        if let Some(value) = incoming {
            *slot = Some(value.to_string());
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("has_password", &self.password_hash.is_some())
            .field("external_id", &self.external_id)
            .field("role", &self.role)
            .field("is_verified", &self.is_verified)
            .finish()
    }
}
