// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signing key lifecycle — Ed25519 and ECDSA P-256 key pairs held in the
// secret store, plus signing and infallible verification.
//
// Key material is a PKCS#8 DER document generated once per algorithm and
// persisted under a stable per-algorithm key; later calls load rather than
// regenerate. Generation and signing are fail-able; verification never is —
// it must be safely callable on attacker-supplied signatures, so malformed
// input simply yields `false`.

use std::sync::Arc;

use ring::rand::SystemRandom;
use ring::signature::{
    self, ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, Ed25519KeyPair, KeyPair,
    UnparsedPublicKey,
};
use tracing::{debug, instrument};

use shieldmark_bridge::SecretStore;
use shieldmark_core::error::{Result, ShieldmarkError};
use shieldmark_core::types::SignatureAlgorithm;

/// Secret-store key for the Ed25519 signing key.
const ED25519_SECRET_KEY: &str = "signing.private_key.ed25519";
/// Secret-store key for the P-256 signing key.
const P256_SECRET_KEY: &str = "signing.private_key.p256";

/// A signature together with the key material needed to verify it.
#[derive(Debug, Clone)]
pub struct SignedMessage {
    /// Signature bytes (raw for Ed25519, ASN.1 DER for P-256).
    pub signature: Vec<u8>,
    /// Raw public key bytes of the signer.
    pub public_key: Vec<u8>,
    pub algorithm: SignatureAlgorithm,
}

/// Owns the signing key pair lifecycle for both supported algorithms.
pub struct KeyManager {
    secrets: Arc<dyn SecretStore>,
}

impl KeyManager {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }

    /// Return the public key for `algorithm`, generating and persisting the
    /// key pair on first use.
    #[instrument(skip(self))]
    pub fn get_or_create_key_pair(&self, algorithm: SignatureAlgorithm) -> Result<Vec<u8>> {
        match algorithm {
            SignatureAlgorithm::Ed25519 => {
                Ok(self.ed25519_key_pair()?.public_key().as_ref().to_vec())
            }
            SignatureAlgorithm::P256 => Ok(self.p256_key_pair()?.public_key().as_ref().to_vec()),
        }
    }

    /// Sign `message` with the per-algorithm key, creating it if needed.
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub fn sign(&self, message: &[u8], algorithm: SignatureAlgorithm) -> Result<SignedMessage> {
        match algorithm {
            SignatureAlgorithm::Ed25519 => {
                let key_pair = self.ed25519_key_pair()?;
                let signature = key_pair.sign(message);
                Ok(SignedMessage {
                    signature: signature.as_ref().to_vec(),
                    public_key: key_pair.public_key().as_ref().to_vec(),
                    algorithm,
                })
            }
            SignatureAlgorithm::P256 => {
                let key_pair = self.p256_key_pair()?;
                let rng = SystemRandom::new();
                let signature = key_pair
                    .sign(&rng, message)
                    .map_err(|e| ShieldmarkError::Signing(format!("p256 signing failed: {e}")))?;
                Ok(SignedMessage {
                    signature: signature.as_ref().to_vec(),
                    public_key: key_pair.public_key().as_ref().to_vec(),
                    algorithm,
                })
            }
        }
    }

    /// Check `signature` over `message` against `public_key`.
    ///
    /// Never fails: invalid, malformed, or truncated signatures and keys
    /// yield `false`.
    pub fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: &[u8],
        algorithm: SignatureAlgorithm,
    ) -> bool {
        let verification: &'static dyn signature::VerificationAlgorithm = match algorithm {
            SignatureAlgorithm::Ed25519 => &signature::ED25519,
            SignatureAlgorithm::P256 => &signature::ECDSA_P256_SHA256_ASN1,
        };
        UnparsedPublicKey::new(verification, public_key)
            .verify(message, signature)
            .is_ok()
    }

    // -----------------------------------------------------------------------
    // Key persistence
    // -----------------------------------------------------------------------

    fn ed25519_key_pair(&self) -> Result<Ed25519KeyPair> {
        if let Some(der) = self.secrets.load_secret(ED25519_SECRET_KEY)? {
            return Ed25519KeyPair::from_pkcs8(&der).map_err(|e| {
                ShieldmarkError::KeyGeneration(format!("stored ed25519 key rejected: {e}"))
            });
        }

        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).map_err(|e| {
            ShieldmarkError::KeyGeneration(format!("ed25519 key generation failed: {e}"))
        })?;
        self.secrets.store_secret(ED25519_SECRET_KEY, pkcs8.as_ref())?;

        debug!("ed25519 signing key generated");
        Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).map_err(|e| {
            ShieldmarkError::KeyGeneration(format!("ed25519 key parsing failed: {e}"))
        })
    }

    fn p256_key_pair(&self) -> Result<EcdsaKeyPair> {
        let rng = SystemRandom::new();

        if let Some(der) = self.secrets.load_secret(P256_SECRET_KEY)? {
            return EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &der, &rng)
                .map_err(|e| {
                    ShieldmarkError::KeyGeneration(format!("stored p256 key rejected: {e}"))
                });
        }

        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).map_err(
            |e| ShieldmarkError::KeyGeneration(format!("p256 key generation failed: {e}")),
        )?;
        self.secrets.store_secret(P256_SECRET_KEY, pkcs8.as_ref())?;

        debug!("p256 signing key generated");
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
            .map_err(|e| ShieldmarkError::KeyGeneration(format!("p256 key parsing failed: {e}")))
    }
}
