//! Splitting the signed client data around its challenge.
//!
//! The verifier contract never receives the client data JSON as is. It gets the text before and
//! after the challenge, re-inserts the challenge it derived itself from the action payload, and
//! hashes the result. Locating the challenge must therefore be an exact substring match on the
//! raw text; the JSON is never parsed.

use crate::error::SignatureError;
use serde::{Deserialize, Serialize};

/// The client data JSON text decomposed around the embedded challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSplit {
    /// Client data text before the challenge.
    pub prefix: String,
    /// The challenge itself.
    pub challenge: String,
    /// Client data text after the challenge.
    pub suffix: String,
}

impl ChallengeSplit {
    /// Locates the first occurrence of `challenge` in `client_data`.
    pub fn locate(client_data: &[u8], challenge: &str) -> Result<Self, SignatureError> {
        let text = std::str::from_utf8(client_data)?;
        if challenge.is_empty() {
            return Err(SignatureError::ChallengeNotFound(challenge.to_string()));
        }
        let pos = text
            .find(challenge)
            .ok_or_else(|| SignatureError::ChallengeNotFound(challenge.to_string()))?;

        Ok(Self {
            prefix: text[..pos].to_string(),
            challenge: challenge.to_string(),
            suffix: text[pos + challenge.len()..].to_string(),
        })
    }

    /// Reassembles the original client data text.
    pub fn client_data(&self) -> String {
        [self.prefix.as_str(), self.challenge.as_str(), self.suffix.as_str()].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_DATA: &str = r#"{"type":"webauthn.get","challenge":"q2Xa_jS8u7hN-WfzLk0Yw3mP9sRcVbT4eD1oAiJxZqE","origin":"http://localhost:3000","crossOrigin":false}"#;
    const CHALLENGE: &str = "q2Xa_jS8u7hN-WfzLk0Yw3mP9sRcVbT4eD1oAiJxZqE";

    #[test]
    fn splits_around_challenge() {
        let split = ChallengeSplit::locate(CLIENT_DATA.as_bytes(), CHALLENGE).unwrap();

        assert_eq!(split.prefix, r#"{"type":"webauthn.get","challenge":""#);
        assert_eq!(
            split.suffix,
            r#"","origin":"http://localhost:3000","crossOrigin":false}"#
        );
        assert_eq!(split.client_data(), CLIENT_DATA);
    }

    #[test]
    fn preserves_whitespace_and_escapes() {
        let client_data = "{ \"type\" : \"webauthn.get\",\n  \"challenge\" : \"abc\", \"origin\":\"https:\\/\\/example.com\" }";

        let split = ChallengeSplit::locate(client_data.as_bytes(), "abc").unwrap();

        assert_eq!(split.prefix, "{ \"type\" : \"webauthn.get\",\n  \"challenge\" : \"");
        assert_eq!(split.client_data(), client_data);
    }

    #[test]
    fn uses_first_occurrence() {
        let split = ChallengeSplit::locate(br#"{"a":"xy","b":"xy"}"#, "xy").unwrap();

        assert_eq!(split.prefix, r#"{"a":""#);
        assert_eq!(split.suffix, r#"","b":"xy"}"#);
    }

    #[test]
    fn round_trips_for_every_position() {
        let challenge = "AAEC";
        for pos in 0..=CLIENT_DATA.len() {
            if !CLIENT_DATA.is_char_boundary(pos) {
                continue;
            }
            let text = format!("{}{challenge}{}", &CLIENT_DATA[..pos], &CLIENT_DATA[pos..]);
            if text.find(challenge) != Some(pos) {
                continue;
            }

            let split = ChallengeSplit::locate(text.as_bytes(), challenge).unwrap();
            assert_eq!(format!("{}{}{}", split.prefix, challenge, split.suffix), text);
        }
    }

    #[test]
    fn missing_challenge() {
        let err = ChallengeSplit::locate(CLIENT_DATA.as_bytes(), "not-there").unwrap_err();
        assert!(matches!(err, SignatureError::ChallengeNotFound(c) if c == "not-there"));

        let err = ChallengeSplit::locate(CLIENT_DATA.as_bytes(), "").unwrap_err();
        assert!(matches!(err, SignatureError::ChallengeNotFound(_)));
    }

    #[test]
    fn rejects_non_utf8_client_data() {
        let err = ChallengeSplit::locate(&[0x7b, 0xff, 0xfe, 0x7d], "x").unwrap_err();
        assert!(matches!(err, SignatureError::InvalidClientData(_)));
    }
}
