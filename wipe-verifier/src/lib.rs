//! Verification engine for secure-wipe certificates.
//!
//! A certificate is a JSON object asserting that a device was erased. The
//! engine normalizes alias field names, checks required fields, compares
//! declared SHA-256 digests and tries a fixed list of RSA signature strategies
//! against a known public key, then folds everything into a [`Verdict`].
//!
//! [`Verdict`]: certificate::Verdict

pub mod certificate;
