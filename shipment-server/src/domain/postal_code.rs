//! Postal code type.

use std::fmt;

/// Error returned when parsing an invalid postal code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid postal code: {reason}")]
pub struct InvalidPostalCode {
    reason: &'static str,
}

/// A facility postal code, used as the key for timezone resolution.
///
/// Postal codes are 1-10 characters of ASCII letters, digits, dashes, or a
/// single internal space (e.g. `60612`, `K1A 0B1`). Letters are normalized to
/// uppercase, so two codes that differ only in case compare equal.
///
/// # Examples
///
/// ```
/// use shipment_server::domain::PostalCode;
///
/// let zip = PostalCode::parse("60612").unwrap();
/// assert_eq!(zip.as_str(), "60612");
///
/// // Case-insensitive
/// assert_eq!(
///     PostalCode::parse("k1a 0b1").unwrap(),
///     PostalCode::parse("K1A 0B1").unwrap(),
/// );
///
/// // Empty is rejected
/// assert!(PostalCode::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a postal code from a string.
    ///
    /// Leading and trailing whitespace is trimmed, letters are uppercased.
    pub fn parse(s: &str) -> Result<Self, InvalidPostalCode> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidPostalCode {
                reason: "must not be empty",
            });
        }

        if trimmed.len() > 10 {
            return Err(InvalidPostalCode {
                reason: "must be at most 10 characters",
            });
        }

        for c in trimmed.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != ' ' {
                return Err(InvalidPostalCode {
                    reason: "must be ASCII letters, digits, dashes, or spaces",
                });
            }
        }

        Ok(PostalCode(trimmed.to_ascii_uppercase()))
    }

    /// Returns the normalized postal code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostalCode({})", self.0)
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
