//! Dev-only diagnostics. Review text is never logged; documents are
//! identified by a short hash instead.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

pub const ENV_DEV_LOG: &str = "COMFORT_DEV_LOG";

/// Activation requires BOTH:
///   - COMFORT_DEV_LOG=1
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    cfg!(debug_assertions) || is_dev_env(&std::env::var("SHUTTLE_ENV").unwrap_or_default())
}

fn is_dev_env(shuttle_env: &str) -> bool {
    matches!(
        shuttle_env.to_ascii_lowercase().as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of SHA-256, hex encoded.
pub fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_short_and_stable() {
        let a = anon_hash("my elite strap broke");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("my elite strap broke"));
        assert_ne!(a, anon_hash("my elite strap broke!"));
    }

    #[test]
    fn dev_env_names() {
        assert!(is_dev_env("Local"));
        assert!(is_dev_env("dev"));
        assert!(!is_dev_env("production"));
        assert!(!is_dev_env(""));
    }
}
