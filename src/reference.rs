//! # Image Reference Parsing
//!
//! Parses repo-tag strings such as `quay.io/podman/stable:v3.4` into their
//! name, tag and digest components following the distribution reference
//! grammar:
//!
//! ```text
//! reference        := name [ ":" [ tag ] ] [ "@" digest ]
//! name             := [ domain "/" ] path-component [ "/" path-component ]*
//! domain           := domain-component [ "." domain-component ]* [ ":" port ]
//! domain-component := [a-zA-Z0-9] | [a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]
//! path-component   := [a-z0-9]+ ( separator [a-z0-9]+ )*
//! separator        := "." | "_" | "__" | "-"+
//! tag              := [A-Za-z0-9_][A-Za-z0-9_.-]{0,127}
//! digest           := algorithm ":" hex{32,}
//! ```
//!
//! Word characters are ASCII only: a tag such as `v版本` does not parse.
//!
//! ## Digests
//!
//! Only `sha256`, `sha384` and `sha512` are supported, with lowercase hex
//! of exactly 64, 96 and 128 characters. Anything else the grammar admits
//! fails with [`ReferenceError::InvalidDigest`].
//!
//! ## No Normalization
//!
//! Unlike `docker pull`, nothing is filled in: `alpine` stays `alpine` (not
//! `docker.io/library/alpine`) and a missing tag stays missing (not
//! `latest`). Listings must show exactly what the engine stored.
//!
//! ## Lenient Forms
//!
//! Two forms outside the strict grammar are accepted because engines emit
//! them for partially-tagged images:
//!
//! - `name:` (trailing colon) parses with an empty tag.
//! - `@algorithm:hex` parses as a nameless, digest-only reference.

use crate::constants::{MAX_NAME_LEN, MAX_TAG_LEN, MIN_DIGEST_HEX_LEN};
use crate::error::ReferenceError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const DOMAIN_COMPONENT: &str = "(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])";
const PATH_COMPONENT: &str = "[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*";
const DIGEST_ALGORITHM: &str = "[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*";

lazy_static! {
    static ref REFERENCE: Regex = {
        let domain = format!(
            "{dc}(?:\\.{dc})*(?::[0-9]+)?",
            dc = DOMAIN_COMPONENT
        );
        let name = format!(
            "(?:{domain}/)?{pc}(?:/{pc})*",
            domain = domain,
            pc = PATH_COMPONENT
        );
        let tag = format!("[A-Za-z0-9_][A-Za-z0-9_.-]{{0,{}}}", MAX_TAG_LEN - 1);
        let digest = format!(
            "{algorithm}:[A-Fa-f0-9]{{{min},}}",
            algorithm = DIGEST_ALGORITHM,
            min = MIN_DIGEST_HEX_LEN
        );
        Regex::new(&format!(
            "^(?P<name>{name})?(?P<sep>:(?P<tag>{tag})?)?(?:@(?P<digest>{digest}))?$",
            name = name,
            tag = tag,
            digest = digest
        ))
        .expect("reference grammar is a valid regex")
    };
}

/// A parsed image reference.
///
/// Components are stored exactly as they appeared in the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    name: Option<String>,
    tag: Option<String>,
    digest: Option<String>,
}

impl Reference {
    /// Parses a reference string.
    ///
    /// # Errors
    ///
    /// - [`ReferenceError::Empty`] for empty input
    /// - [`ReferenceError::ContainsUppercase`] when only the case is wrong
    /// - [`ReferenceError::InvalidFormat`] when the grammar does not match
    /// - [`ReferenceError::NameTooLong`] when the name exceeds [`MAX_NAME_LEN`]
    /// - [`ReferenceError::InvalidDigest`] for an unsupported algorithm,
    ///   uppercase hex or a wrong-length digest
    ///
    /// [`MAX_NAME_LEN`]: crate::constants::MAX_NAME_LEN
    pub fn parse(s: &str) -> Result<Self, ReferenceError> {
        if s.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let captures = match REFERENCE.captures(s) {
            Some(captures) => captures,
            None if REFERENCE.is_match(&s.to_lowercase()) => {
                return Err(ReferenceError::ContainsUppercase(s.to_string()));
            }
            None => return Err(ReferenceError::InvalidFormat(s.to_string())),
        };

        let name = captures.name("name").map(|m| m.as_str().to_string());
        let digest = captures.name("digest").map(|m| m.as_str().to_string());
        let tag = match (captures.name("sep"), captures.name("tag")) {
            (Some(_), Some(tag)) => Some(tag.as_str().to_string()),
            (Some(_), None) => Some(String::new()),
            (None, _) => None,
        };

        match &name {
            Some(name) if name.len() > MAX_NAME_LEN => {
                return Err(ReferenceError::NameTooLong {
                    reference: s.to_string(),
                    limit: MAX_NAME_LEN,
                });
            }
            Some(_) => {}
            // A nameless reference is only meaningful as a bare digest.
            None if digest.is_none() || tag.is_some() => {
                return Err(ReferenceError::InvalidFormat(s.to_string()));
            }
            None => {}
        }

        if let Some(digest) = &digest {
            validate_digest(digest)?;
        }

        Ok(Self { name, tag, digest })
    }

    /// Full repository name, including any domain.
    ///
    /// `None` only for digest-only references.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Registry domain, if the first name component looks like one.
    ///
    /// Same heuristic as the docker CLI: the component must contain a `.` or
    /// a `:`, or be exactly `localhost`.
    pub fn domain(&self) -> Option<&str> {
        self.split_name().0
    }

    /// Repository path with any domain removed.
    pub fn path(&self) -> Option<&str> {
        self.name.as_ref().map(|_| self.split_name().1)
    }

    /// Tag as written. `Some("")` when the input ended in a bare `:`.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Digest (`algorithm:hex`), if present.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    fn split_name(&self) -> (Option<&str>, &str) {
        let name = match &self.name {
            Some(name) => name.as_str(),
            None => return (None, ""),
        };
        match name.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (Some(first), rest)
            }
            _ => (None, name),
        }
    }
}

fn validate_digest(digest: &str) -> Result<(), ReferenceError> {
    let invalid = || ReferenceError::InvalidDigest(digest.to_string());
    let (algorithm, hex) = digest.split_once(':').ok_or_else(invalid)?;

    let expected = match algorithm {
        "sha256" => 64,
        "sha384" => 96,
        "sha512" => 128,
        _ => return Err(invalid()),
    };
    if hex.len() != expected || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(invalid());
    }
    Ok(())
}

impl FromStr for Reference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reference::parse(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}", name)?;
        }
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_requires_dot_colon_or_localhost() {
        let r = Reference::parse("library/alpine:3.18").unwrap();
        assert_eq!(r.domain(), None);
        assert_eq!(r.path(), Some("library/alpine"));

        let r = Reference::parse("localhost/app").unwrap();
        assert_eq!(r.domain(), Some("localhost"));
        assert_eq!(r.path(), Some("app"));

        let r = Reference::parse("localhost:5000/team/app:dev").unwrap();
        assert_eq!(r.domain(), Some("localhost:5000"));
        assert_eq!(r.path(), Some("team/app"));
        assert_eq!(r.tag(), Some("dev"));
    }

    #[test]
    fn trailing_colon_is_empty_tag() {
        let r = Reference::parse("app:").unwrap();
        assert_eq!(r.name(), Some("app"));
        assert_eq!(r.tag(), Some(""));
    }

    #[test]
    fn display_round_trips_input() {
        let input = "quay.io/podman/stable:v3.4";
        assert_eq!(Reference::parse(input).unwrap().to_string(), input);
    }
}
