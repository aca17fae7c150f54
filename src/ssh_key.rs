//! Normalisation of SSH public key material before submission.
//!
//! Users frequently paste only the base64 payload of a public key. The
//! payload begins with the encoded algorithm name, so the missing prefix can
//! be recovered for the key types the marketplace accepts.

use thiserror::Error;

/// Algorithm names accepted as an explicit key prefix.
const KNOWN_ALGORITHMS: [&str; 8] = [
    "ssh-ed25519",
    "ssh-rsa",
    "ssh-dss",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
    "sk-ssh-ed25519@openssh.com",
    "sk-ecdsa-sha2-nistp256@openssh.com",
];

const ED25519_PAYLOAD: &str = "AAAAC3NzaC1lZDI1NTE5";
const RSA_PAYLOAD: &str = "AAAAB3NzaC1yc2E";
const ECDSA_PAYLOAD: &str = "AAAAE2VjZHNhLXNoYTItbmlzdHA";

/// ECDSA curve markers as they appear inside the base64 payload.
const ECDSA_CURVES: [(&str, &str); 3] = [
    ("bmlzdHAyNTY", "ecdsa-sha2-nistp256"),
    ("bmlzdHAzODQ", "ecdsa-sha2-nistp384"),
    ("bmlzdHA1MjE", "ecdsa-sha2-nistp521"),
];

/// Errors raised when key material cannot be normalised.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SshKeyError {
    /// No key material was supplied.
    #[error("SSH public key is empty")]
    Empty,
    /// The key names an algorithm but carries no payload.
    #[error("SSH public key for {algorithm} is missing its base64 payload")]
    MissingPayload {
        /// Algorithm prefix found on the key.
        algorithm: String,
    },
    /// The key has no recognised algorithm prefix or payload header.
    #[error(
        "unrecognised SSH public key: expected it to start with one of {} or a bare ed25519/rsa/ecdsa payload",
        KNOWN_ALGORITHMS.join(", ")
    )]
    Unrecognised,
}

/// Returns `raw` as a complete `<algorithm> <payload> [comment]` key.
///
/// Keys that already carry a known algorithm prefix are returned unchanged
/// apart from surrounding whitespace. Bare payloads gain the prefix matching
/// their encoded header.
///
/// # Errors
///
/// Returns [`SshKeyError`] when the key is empty, has an empty payload, or
/// cannot be attributed to a supported algorithm.
pub fn normalise_public_key(raw: &str) -> Result<String, SshKeyError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(SshKeyError::Empty);
    }

    let first_word = key.split_whitespace().next().unwrap_or_default();
    if let Some(algorithm) = KNOWN_ALGORITHMS.iter().find(|name| **name == first_word) {
        if key.split_whitespace().nth(1).is_none() {
            return Err(SshKeyError::MissingPayload {
                algorithm: (*algorithm).to_owned(),
            });
        }
        return Ok(key.to_owned());
    }

    let prefix = detect_algorithm(key).ok_or(SshKeyError::Unrecognised)?;
    Ok(format!("{prefix} {key}"))
}

fn detect_algorithm(payload: &str) -> Option<&'static str> {
    if payload.starts_with(ED25519_PAYLOAD) {
        return Some("ssh-ed25519");
    }
    if payload.starts_with(RSA_PAYLOAD) {
        return Some("ssh-rsa");
    }
    if payload.starts_with(ECDSA_PAYLOAD) {
        return ECDSA_CURVES
            .iter()
            .find(|(marker, _)| payload.contains(marker))
            .map(|(_, algorithm)| *algorithm);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ED25519_KEY: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIGxvY2FsLXRlc3Qta2V5LW1hdGVyaWFs";

    #[test]
    fn bare_ed25519_payload_gains_prefix() {
        let key = normalise_public_key(ED25519_KEY)
            .unwrap_or_else(|err| panic!("payload should normalise: {err}"));
        assert_eq!(key, format!("ssh-ed25519 {ED25519_KEY}"));
    }

    #[rstest]
    #[case("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAI user@example.com")]
    #[case("ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQ")]
    #[case("ecdsa-sha2-nistp256 AAAAE2VjZHNhLXNoYTItbmlzdHAyNTYAAAAIbmlzdHAyNTY")]
    fn prefixed_keys_pass_through(#[case] input: &str) {
        let key = normalise_public_key(input)
            .unwrap_or_else(|err| panic!("prefixed key should pass: {err}"));
        assert_eq!(key, input);
    }

    #[rstest]
    #[case("AAAAB3NzaC1yc2EAAAADAQABAAABAQ", "ssh-rsa")]
    #[case("AAAAE2VjZHNhLXNoYTItbmlzdHAzODQAAAAIbmlzdHAzODQ", "ecdsa-sha2-nistp384")]
    #[case("AAAAE2VjZHNhLXNoYTItbmlzdHA1MjEAAAAIbmlzdHA1MjE", "ecdsa-sha2-nistp521")]
    fn bare_payloads_detect_algorithm(#[case] payload: &str, #[case] algorithm: &str) {
        let key = normalise_public_key(payload)
            .unwrap_or_else(|err| panic!("payload should normalise: {err}"));
        assert_eq!(key, format!("{algorithm} {payload}"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let key = normalise_public_key(&format!("  {ED25519_KEY}\n"))
            .unwrap_or_else(|err| panic!("payload should normalise: {err}"));
        assert_eq!(key, format!("ssh-ed25519 {ED25519_KEY}"));
    }

    #[rstest]
    #[case("not-a-key")]
    #[case("ssh-foo AAAAC3Nza")]
    #[case("AAAAB4bogus")]
    fn unrecognised_material_is_rejected(#[case] input: &str) {
        assert_eq!(normalise_public_key(input), Err(SshKeyError::Unrecognised));
    }

    #[test]
    fn empty_and_payloadless_keys_are_rejected() {
        assert_eq!(normalise_public_key("   "), Err(SshKeyError::Empty));
        assert_eq!(
            normalise_public_key("ssh-ed25519"),
            Err(SshKeyError::MissingPayload {
                algorithm: String::from("ssh-ed25519")
            })
        );
    }
}
