//! Utility functions

use serde::{Deserialize, Serialize};

/// Literal prefix of every generated nonce
pub const NONCE_PREFIX: &str = "n-";

/// Number of random characters following the prefix
pub const NONCE_LEN: usize = 7;

const BASE36_CHARS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Version information for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("DEPLOYCTL_GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("DEPLOYCTL_BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Generate a short attempt nonce such as `n-k3v9x0a`.
///
/// The random part is drawn from the low bits of a v4 UUID, which are all
/// random. Uniqueness is probabilistic only.
pub fn generate_nonce() -> String {
    let mut bits = uuid::Uuid::new_v4().as_u128();
    let mut nonce = String::with_capacity(NONCE_PREFIX.len() + NONCE_LEN);
    nonce.push_str(NONCE_PREFIX);
    for _ in 0..NONCE_LEN {
        nonce.push(BASE36_CHARS[(bits % 36) as usize] as char);
        bits /= 36;
    }
    nonce
}
