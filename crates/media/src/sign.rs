//! Request signing for authorized uploads.
//!
//! The provider expects the signed parameters sorted alphabetically,
//! joined as `key=value` pairs with `&`, with the API secret appended, and
//! the whole string hashed with SHA-1. `file`, `api_key`, and the
//! signature itself are never part of the signed set.

use std::collections::BTreeMap;

use sha1::{Digest, Sha1};

/// Signs a parameter set with the API secret.
///
/// The `BTreeMap` gives the alphabetical ordering the provider verifies
/// against.
pub(crate) fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
