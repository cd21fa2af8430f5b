use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;

use crate::github::{GithubRepoName, PullRequestNumber};

/// Header carrying the HMAC-SHA1 signature of the request body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";
/// Header carrying the webhook event type.
pub const EVENT_HEADER: &str = "x-github-event";

const SIGNATURE_PREFIX: &str = "sha1=";

type HmacSha1 = Hmac<Sha1>;

/// Wrapper for a secret which is zeroed on drop and can be exposed only through the [`WebhookSecret::expose`] method.
pub struct WebhookSecret(SecretString);

impl WebhookSecret {
    pub fn new(secret: String) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("payload signature check failed")]
pub struct SignatureMismatch;

fn keyed_mac(secret: &WebhookSecret, body: &[u8]) -> HmacSha1 {
    let mut mac =
        HmacSha1::new_from_slice(secret.expose().as_bytes()).expect("Cannot create HMAC key");
    mac.update(body);
    mac
}

/// Computes the `sha1=<hex>` signature GitHub sends for `body` signed with `secret`.
pub fn sign(secret: &WebhookSecret, body: &[u8]) -> String {
    let digest = keyed_mac(secret, body).finalize().into_bytes();
    format!("{SIGNATURE_PREFIX}{}", hex::encode(digest))
}

/// Verifies that `signature` is the lowercase `sha1=<hex>` HMAC of `body` under `secret`.
///
/// The digest comparison is constant-time.
pub fn validate(
    secret: &WebhookSecret,
    body: &[u8],
    signature: &[u8],
) -> Result<(), SignatureMismatch> {
    let mac = keyed_mac(secret, body);

    let provided = signature
        .strip_prefix(SIGNATURE_PREFIX.as_bytes())
        .filter(|digest| digest.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')))
        .and_then(|digest| hex::decode(digest).ok());
    if let Some(provided) = provided {
        if mac.clone().verify_slice(&provided).is_ok() {
            return Ok(());
        }
    }

    let expected = format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    );
    tracing::warn!(
        "Expected signature {expected:?}, but got {:?}",
        String::from_utf8_lossy(signature)
    );
    Err(SignatureMismatch)
}

/// A webhook delivery, keyed by the value of the `X-GitHub-Event` header.
/// Only pull request events are modelled, everything else is kept as its event type.
#[derive(Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    PullRequest(PullRequestEvent),
    Other(String),
}

impl WebhookEvent {
    pub fn event_type(&self) -> &str {
        match self {
            WebhookEvent::PullRequest(_) => "pull_request",
            WebhookEvent::Other(event_type) => event_type,
        }
    }

    pub fn repository(&self) -> Option<&GithubRepoName> {
        match self {
            WebhookEvent::PullRequest(event) => Some(&event.repository),
            WebhookEvent::Other(_) => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub action: String,
    pub repository: GithubRepoName,
    pub number: PullRequestNumber,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookRepository {
    full_name: String,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookPullRequest {
    action: String,
    number: u64,
    repository: WebhookRepository,
}

#[derive(thiserror::Error, Debug)]
pub enum EventParseError {
    #[error("invalid pull request payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid repository name {0:?}")]
    RepositoryName(String),
}

/// Parses the body of a delivery according to its event type.
/// The body is only inspected for pull request events.
pub fn parse_webhook_event(
    event_type: Option<&str>,
    body: &[u8],
) -> Result<WebhookEvent, EventParseError> {
    match event_type {
        Some("pull_request") => {
            let payload: WebhookPullRequest = serde_json::from_slice(body)?;
            let repository = GithubRepoName::from_full_name(&payload.repository.full_name)
                .ok_or(EventParseError::RepositoryName(payload.repository.full_name))?;
            Ok(WebhookEvent::PullRequest(PullRequestEvent {
                action: payload.action,
                repository,
                number: payload.number.into(),
            }))
        }
        other => {
            tracing::debug!("Ignoring event type {other:?}");
            Ok(WebhookEvent::Other(other.unwrap_or_default().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_webhook_event, sign, validate, SignatureMismatch, WebhookSecret};
    use crate::tests::io::load_test_file;

    fn secret() -> WebhookSecret {
        WebhookSecret::new("ABCDEF".to_string())
    }

    #[test]
    fn known_signature() {
        // Reference value from the HMAC-SHA1 test vectors (RFC 2202, case 2).
        let secret = WebhookSecret::new("Jefe".to_string());
        assert_eq!(
            sign(&secret, b"what do ya want for nothing?"),
            "sha1=effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn accept_own_signature() {
        let body = load_test_file("webhook/pull-request-opened.json");
        let signature = sign(&secret(), body.as_bytes());
        assert_eq!(validate(&secret(), body.as_bytes(), signature.as_bytes()), Ok(()));
    }

    #[test]
    fn reject_any_flipped_bit() {
        let body = b"{\"action\":\"opened\"}";
        let signature = sign(&secret(), body).into_bytes();
        for index in 0..signature.len() {
            for bit in 0..8 {
                let mut tampered = signature.clone();
                tampered[index] ^= 1 << bit;
                assert_eq!(
                    validate(&secret(), body, &tampered),
                    Err(SignatureMismatch),
                    "byte {index} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn reject_other_secret() {
        let body = b"payload";
        let signature = sign(&WebhookSecret::new("other".to_string()), body);
        assert!(validate(&secret(), body, signature.as_bytes()).is_err());
    }

    #[test]
    fn reject_malformed_signature() {
        let body = b"payload";
        let signature = sign(&secret(), body);
        let digest = signature.strip_prefix("sha1=").unwrap();

        assert!(validate(&secret(), body, b"").is_err());
        assert!(validate(&secret(), body, digest.as_bytes()).is_err());
        assert!(validate(&secret(), body, format!("sha256={digest}").as_bytes()).is_err());
        assert!(validate(&secret(), body, digest.to_uppercase().as_bytes()).is_err());
        assert!(validate(&secret(), body, b"sha1=zz").is_err());
    }

    #[test]
    fn parse_pull_request_opened() {
        let body = load_test_file("webhook/pull-request-opened.json");
        insta::assert_debug_snapshot!(
            parse_webhook_event(Some("pull_request"), body.as_bytes()).unwrap(),
            @r###"
        PullRequest(
            PullRequestEvent {
                action: "opened",
                repository: GithubRepoName {
                    owner: "acme",
                    name: "widget",
                },
                number: PullRequestNumber(
                    42,
                ),
            },
        )
        "###
        );
    }

    #[test]
    fn parse_pull_request_labeled() {
        let body = load_test_file("webhook/pull-request-labeled.json");
        insta::assert_debug_snapshot!(
            parse_webhook_event(Some("pull_request"), body.as_bytes()).unwrap(),
            @r###"
        PullRequest(
            PullRequestEvent {
                action: "labeled",
                repository: GithubRepoName {
                    owner: "acme",
                    name: "widget",
                },
                number: PullRequestNumber(
                    42,
                ),
            },
        )
        "###
        );
    }

    #[test]
    fn other_events_are_not_parsed() {
        assert_eq!(
            parse_webhook_event(Some("push"), b"not json").unwrap().event_type(),
            "push"
        );
        assert_eq!(
            parse_webhook_event(None, b"not json").unwrap().event_type(),
            ""
        );
    }

    #[test]
    fn malformed_pull_request() {
        assert!(parse_webhook_event(Some("pull_request"), b"{").is_err());
        assert!(parse_webhook_event(
            Some("pull_request"),
            br#"{"action": "opened", "number": 1, "repository": {"full_name": "acme"}}"#
        )
        .is_err());
    }
}
