//! Password hashing policy backed by bcrypt.
//!
//! The policy cost is the "current default". Hashes produced with a lower cost, or with
//! a legacy `2a`/`2y` version prefix, are reported by [`PasswordPolicy::needs_rehash`]
//! so they can be upgraded after a successful login.

use bcrypt::{BcryptResult, hash, verify};

const CURRENT_VERSION: &str = "2b";

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    cost: u32,
    /// Verified against when no account matches, so both failure paths pay for one bcrypt run.
    dummy_hash: String,
}

impl PasswordPolicy {
    pub fn new(cost: u32) -> BcryptResult<Self> {
        let dummy_hash = hash(crate::utils::generate_random_string(24), cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a plaintext password with the policy cost.
    pub fn hash(&self, password: &str) -> BcryptResult<String> {
        hash(password, self.cost)
    }

    /// Verifies `password` with bcrypt's own routine.
    ///
    /// # Errors
    /// Returns an error when `stored_hash` is not a bcrypt hash.
    pub fn verify(&self, password: &str, stored_hash: &str) -> BcryptResult<bool> {
        verify(password, stored_hash)
    }

    /// Burns one verification against the dummy hash. The result is always ignored.
    pub fn verify_dummy(&self, password: &str) {
        let _ = verify(password, &self.dummy_hash);
    }

    /// True when `stored_hash` was produced with weaker parameters than the policy.
    ///
    /// Unparsable hashes return `false`; `verify` is the one that rejects them.
    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        let mut parts = stored_hash.split('$');
        let (Some(""), Some(version), Some(cost), Some(_)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        match cost.parse::<u32>() {
            Ok(cost) => version != CURRENT_VERSION || cost < self.cost,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let policy = PasswordPolicy::new(4).unwrap();
        let hashed = policy.hash("password").unwrap();

        assert!(hashed.starts_with("$2b$04$"));
        assert!(policy.verify("password", &hashed).unwrap());
        assert!(!policy.verify("Password", &hashed).unwrap());
    }

    #[test]
    fn test_needs_rehash_on_lower_cost() {
        let weak = PasswordPolicy::new(4).unwrap();
        let strong = PasswordPolicy::new(5).unwrap();
        let hashed = weak.hash("password").unwrap();

        assert!(strong.needs_rehash(&hashed));
        assert!(!weak.needs_rehash(&hashed));
        assert!(!strong.needs_rehash(&strong.hash("password").unwrap()));
    }

    #[test]
    fn test_needs_rehash_on_legacy_version() {
        let policy = PasswordPolicy::new(4).unwrap();
        let hashed = policy.hash("password").unwrap();
        let legacy = hashed.replacen("$2b$", "$2y$", 1);

        assert!(policy.needs_rehash(&legacy));
        assert!(policy.verify("password", &legacy).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let policy = PasswordPolicy::new(4).unwrap();

        assert!(!policy.needs_rehash("plaintext"));
        assert!(!policy.needs_rehash("$2b$xx$abc"));
        assert!(policy.verify("password", "plaintext").is_err());
    }
}
