//! Identity candidates - partial identities presented for resolution

use std::fmt;

use crate::entities::User;
use crate::error::DomainError;
use crate::value_objects::{normalize_email, normalize_text};

/// PHC prefix of the hashes this service produces and verifies
const HASH_PREFIX: &str = "$argon2";

// ============================================================================
// Credential
// ============================================================================

/// A password as it arrives at the identity store
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Must be hashed before it is stored
    Plaintext(String),
    /// Already in a slow-hash encoding; stored as is
    Hashed(String),
}

impl Credential {
    /// Classify a raw value by its hash prefix. Empty input is no credential.
    pub fn classify(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else if Self::looks_hashed(raw) {
            Some(Self::Hashed(raw.to_string()))
        } else {
            Some(Self::Plaintext(raw.to_string()))
        }
    }

    pub fn looks_hashed(value: &str) -> bool {
        value.starts_with(HASH_PREFIX)
    }

    #[inline]
    pub fn is_hashed(&self) -> bool {
        matches!(self, Self::Hashed(_))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plaintext(_) => f.write_str("Credential::Plaintext([REDACTED])"),
            Self::Hashed(_) => f.write_str("Credential::Hashed([REDACTED])"),
        }
    }
}

// ============================================================================
// IdentityCandidate
// ============================================================================

/// A partial identity: any non-empty subset of the identity channels plus
/// optional profile data. Values are normalized on the way in.
#[derive(Clone, Default)]
pub struct IdentityCandidate {
    name: Option<String>,
    phone_number: Option<String>,
    email: Option<String>,
    external_id: Option<String>,
    credential: Option<Credential>,
    is_verified: bool,
}

impl IdentityCandidate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = normalize_text(Some(name));
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone_number = normalize_text(Some(phone));
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = normalize_email(Some(email));
        self
    }

    pub fn with_external_id(mut self, external_id: &str) -> Self {
        self.external_id = normalize_text(Some(external_id));
        self
    }

    /// Password of unknown provenance, classified by its hash prefix.
    /// Only for values that may carry a stored hash.
    pub fn with_password(mut self, raw: &str) -> Self {
        self.credential = Credential::classify(raw);
        self
    }

    /// Password typed by a person; always hashed before it is stored,
    /// whatever it looks like
    pub fn with_plaintext_password(mut self, raw: &str) -> Self {
        self.credential = (!raw.is_empty()).then(|| Credential::Plaintext(raw.to_string()));
        self
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    /// Reject candidates that carry no identity channel at all
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.phone_number.is_none() && self.email.is_none() && self.external_id.is_none() {
            return Err(DomainError::MissingIdentity);
        }
        Ok(())
    }

    /// The plaintext password that has to be hashed before persisting, if any.
    ///
    /// A plaintext credential only lands on a new user or on one without a
    /// stored hash; it never replaces an existing hash.
    pub fn plaintext_to_hash(&self, existing: Option<&User>) -> Option<&str> {
        match &self.credential {
            Some(Credential::Plaintext(raw))
                if existing.is_none_or(|user| user.password_hash.is_none()) =>
            {
                Some(raw.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Debug for IdentityCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCandidate")
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("external_id", &self.external_id)
            .field("credential", &self.credential)
            .field("is_verified", &self.is_verified)
            .finish()
    }
}
