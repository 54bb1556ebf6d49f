//! Password hashing for stored credentials.
//!
//! Hashes are argon2 PHC strings produced by `password-auth`. Both functions
//! are CPU-bound; call them through `tokio::task::spawn_blocking` from async
//! code.

/// Hashes `plaintext` with a fresh random salt.
pub fn hash_password(plaintext: &str) -> String {
    password_auth::generate_hash(plaintext)
}

/// Returns whether `plaintext` matches `digest`. A malformed digest never
/// matches.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    password_auth::verify_password(plaintext, digest).is_ok()
}
