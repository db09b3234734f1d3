//! Signing key pairs issued to every new profile.
//!
//! Keys are Ed25519, hex encoded. The rest of the service treats them as two
//! opaque strings.

use ed25519_dalek::SigningKey;

/// Hex-encoded key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Produces a fresh key pair at profile creation time.
pub trait KeyPairGenerator: Send + Sync {
    fn generate(&self) -> KeyPair;
}

/// Ed25519 keys seeded from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeyGenerator;

impl KeyPairGenerator for Ed25519KeyGenerator {
    fn generate(&self) -> KeyPair {
        let seed: [u8; 32] = rand::random();
        let signing_key = SigningKey::from_bytes(&seed);

        KeyPair {
            public_key: hex::encode(signing_key.verifying_key().to_bytes()),
            private_key: hex::encode(signing_key.to_bytes()),
        }
    }
}

/// Always returns the same pair.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedKeyGenerator(pub KeyPair);

#[cfg(test)]
impl KeyPairGenerator for FixedKeyGenerator {
    fn generate(&self) -> KeyPair {
        self.0.clone()
    }
}
