//! # Cryptographic Primitives for VeriPay
//!
//! Everything that touches key material or signature bytes flows through
//! here. The rest of the crate sees two opaque key types and an algorithm
//! enum; it never reaches into `ed25519-dalek` directly.
//!
//! - **Ed25519** (default) — RFC 8032 pure mode, SHA-512 internally.
//! - **Ed25519ph** — RFC 8032 prehash mode over an explicit SHA-512 digest.
//!
//! Keys arrive as PKCS#8 / SPKI documents (PEM or DER) from whatever key
//! management the deployment uses. We decode them; we never mint them.

pub mod keys;
pub mod signatures;

pub use keys::{KeyError, PrivateKey, PublicKey};
pub use signatures::{decode_signature, encode_signature, SignatureAlgorithm, SignatureError};
