//! Gravatar-compatible identifier derivation.
//!
//! A user name is turned into candidate email addresses by appending each
//! configured suffix (`alice` + `@circlecat.org`), and each address is hashed
//! under every active [`HashScheme`]. The resulting hex digests are the
//! filenames an avatar client will request.
//!
//! ```text
//! alice ─┬─ alice@circlecat.org ───┬─ sha256 → f650…
//!        │                         └─ md5    → 83e1…
//!        └─ alice@u.circlecat.org ─┬─ sha256 → d487…
//!                                  └─ md5    → c849…
//! ```
//!
//! Order is suffix-major, scheme-minor. No deduplication happens here:
//! duplicate suffixes or schemes are rejected when the config is loaded
//! (see [`PublishConfig::validate`](crate::config::PublishConfig::validate)).

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A way of turning an email address into a lookup identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashScheme {
    /// Lowercase hex SHA-256 of the trimmed address.
    ///
    /// <https://docs.gravatar.com/api/avatars/hash/>
    Sha256,
    /// Lowercase hex MD5 of the trimmed address, for clients that still
    /// speak the original Gravatar protocol.
    Md5,
    /// Same digest as [`HashScheme::Md5`] with a literal `.jpg` appended.
    /// Gerrit's avatars-gravatar plugin requests this form and infers the
    /// content type from the extension.
    Md5Jpg,
}

impl HashScheme {
    pub const ALL: [HashScheme; 3] = [HashScheme::Sha256, HashScheme::Md5, HashScheme::Md5Jpg];

    /// Hash an email address into a filename under this scheme.
    ///
    /// Leading and trailing whitespace is trimmed before hashing.
    pub fn apply(self, email: &str) -> String {
        let email = email.trim().as_bytes();
        match self {
            HashScheme::Sha256 => format!("{:x}", Sha256::digest(email)),
            HashScheme::Md5 => format!("{:x}", Md5::digest(email)),
            HashScheme::Md5Jpg => format!("{:x}.jpg", Md5::digest(email)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashScheme::Sha256 => "sha256",
            HashScheme::Md5 => "md5",
            HashScheme::Md5Jpg => "md5-jpg",
        }
    }
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One derived identifier together with the address it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub scheme: HashScheme,
    pub filename: String,
}

/// Derive every hashed identity for `user`, suffix-major, scheme-minor.
///
/// The email is `user + suffix` verbatim; the user name is not validated or
/// escaped.
pub fn derive_identities(user: &str, suffixes: &[String], schemes: &[HashScheme]) -> Vec<Identity> {
    let mut identities = Vec::with_capacity(suffixes.len() * schemes.len());
    for suffix in suffixes {
        let email = format!("{user}{suffix}");
        for &scheme in schemes {
            let filename = scheme.apply(&email);
            tracing::debug!(%email, %scheme, %filename, "derived identifier");
            identities.push(Identity {
                email: email.clone(),
                scheme,
                filename,
            });
        }
    }
    identities
}

/// Filenames for one user: the optional canonical `<user>.png` first,
/// followed by every hashed identifier.
pub fn target_set(
    user: &str,
    suffixes: &[String],
    schemes: &[HashScheme],
    canonical_name: bool,
) -> Vec<String> {
    let identities = derive_identities(user, suffixes, schemes);
    let mut targets = Vec::with_capacity(identities.len() + 1);
    if canonical_name {
        targets.push(canonical_filename(user));
    }
    targets.extend(identities.into_iter().map(|i| i.filename));
    targets
}

/// The self-addressed output name for a user: `<user>.png`.
pub fn canonical_filename(user: &str) -> String {
    format!("{user}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes() -> Vec<String> {
        vec!["@circlecat.org".to_string(), "@u.circlecat.org".to_string()]
    }

    #[test]
    fn sha256_matches_known_digest() {
        // printf 'alice@circlecat.org' | sha256sum
        assert_eq!(
            HashScheme::Sha256.apply("alice@circlecat.org"),
            "f650a6273adbe8161b817c0d8362d9b40afa42fafae6925155f7d5c0c377bad5"
        );
    }

    #[test]
    fn md5_matches_known_digest() {
        // printf 'alice@circlecat.org' | md5sum
        assert_eq!(
            HashScheme::Md5.apply("alice@circlecat.org"),
            "83e1ffb33fc9bb3ed75ae6e4a5dd4b39"
        );
    }

    #[test]
    fn md5_matches_rfc_vector() {
        // RFC 1321 test suite: MD5("abc")
        assert_eq!(
            HashScheme::Md5.apply("abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn sha256_matches_fips_vector() {
        // FIPS 180-2: SHA-256("abc")
        assert_eq!(
            HashScheme::Sha256.apply("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn md5_jpg_appends_extension_to_md5() {
        let md5 = HashScheme::Md5.apply("alice@circlecat.org");
        assert_eq!(
            HashScheme::Md5Jpg.apply("alice@circlecat.org"),
            format!("{md5}.jpg")
        );
        assert_eq!(
            HashScheme::Md5Jpg.apply("alice@circlecat.org"),
            "83e1ffb33fc9bb3ed75ae6e4a5dd4b39.jpg"
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        for scheme in HashScheme::ALL {
            assert_eq!(
                scheme.apply("  bob@u.circlecat.org  "),
                scheme.apply("bob@u.circlecat.org"),
                "{scheme} should trim"
            );
        }
    }

    #[test]
    fn digests_are_lowercase_hex() {
        let h = HashScheme::Sha256.apply("Carol@CircleCat.org");
        assert!(h.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn derivation_is_deterministic() {
        let schemes = [HashScheme::Sha256, HashScheme::Md5];
        assert_eq!(
            derive_identities("alice", &suffixes(), &schemes),
            derive_identities("alice", &suffixes(), &schemes)
        );
    }

    #[test]
    fn identities_are_suffix_major_scheme_minor() {
        let schemes = [HashScheme::Sha256, HashScheme::Md5];
        let ids = derive_identities("alice", &suffixes(), &schemes);
        let order: Vec<(&str, HashScheme)> =
            ids.iter().map(|i| (i.email.as_str(), i.scheme)).collect();
        assert_eq!(
            order,
            vec![
                ("alice@circlecat.org", HashScheme::Sha256),
                ("alice@circlecat.org", HashScheme::Md5),
                ("alice@u.circlecat.org", HashScheme::Sha256),
                ("alice@u.circlecat.org", HashScheme::Md5),
            ]
        );
    }

    #[test]
    fn target_set_with_canonical_name() {
        let schemes = [HashScheme::Sha256, HashScheme::Md5];
        let targets = target_set("carol", &suffixes(), &schemes, true);
        assert_eq!(targets.len(), 5);
        assert_eq!(targets[0], "carol.png");
        assert_eq!(targets[1], HashScheme::Sha256.apply("carol@circlecat.org"));
        assert_eq!(targets[4], HashScheme::Md5.apply("carol@u.circlecat.org"));
    }

    #[test]
    fn target_set_hash_only() {
        let targets = target_set("carol", &suffixes(), &HashScheme::ALL, false);
        assert_eq!(targets.len(), 6);
        assert!(!targets.contains(&"carol.png".to_string()));
        assert!(targets[2].ends_with(".jpg"));
    }

    #[test]
    fn user_name_is_not_escaped() {
        let ids = derive_identities("a b@c", &["@x.org".to_string()], &[HashScheme::Md5]);
        assert_eq!(ids[0].email, "a b@c@x.org");
    }

    #[test]
    fn scheme_names_round_trip_through_serde_names() {
        assert_eq!(HashScheme::Md5Jpg.to_string(), "md5-jpg");
        let parsed: Vec<HashScheme> =
            toml::from_str::<toml::Table>("s = [\"sha256\", \"md5\", \"md5-jpg\"]")
                .unwrap()["s"]
                .clone()
                .try_into()
                .unwrap();
        assert_eq!(parsed, HashScheme::ALL.to_vec());
    }
}
