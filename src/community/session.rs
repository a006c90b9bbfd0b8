//! Canonical session shape
//!
//! An authentication provider hands back a loose session payload; the
//! normalizer settles the email and attaches the derived memberships.

use serde::{Deserialize, Serialize};

use crate::community::membership::{CommunityMembership, build_community_memberships};

const FALLBACK_DISPLAY_NAME: &str = "Financegram Member";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    Email,
    LinkedinDemo,
}

/// Session payload as returned by an authentication provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSession {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub provider: ProviderId,
    #[serde(default)]
    pub communities: Vec<CommunityMembership>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub email: String,
    pub provider: ProviderId,
    pub communities: Vec<CommunityMembership>,
}

/// Merge `raw` with derived memberships.
///
/// The session email is the first non-empty of `raw.email` and
/// `fallback_email`, trimmed and lower-cased. A blank name is replaced by
/// one derived from that email.
pub fn normalize_session(raw: &RawSession, fallback_email: Option<&str>) -> Session {
    let candidate = raw
        .email
        .as_deref()
        .filter(|email| !email.is_empty())
        .or(fallback_email.filter(|email| !email.is_empty()))
        .unwrap_or("");
    let email = candidate.trim().to_lowercase();

    let lookup = if email.is_empty() {
        fallback_email.unwrap_or("")
    } else {
        email.as_str()
    };
    let communities = build_community_memberships(lookup, &raw.communities);

    let name = if raw.name.trim().is_empty() {
        derive_name_from_email(&email)
    } else {
        raw.name.clone()
    };

    Session {
        name,
        email,
        provider: raw.provider,
        communities,
    }
}

/// `"jane.doe-smith@x"` -> `"Jane Doe Smith"`.
pub fn derive_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or("");
    if local.is_empty() {
        return FALLBACK_DISPLAY_NAME.to_string();
    }

    let mut spaced = String::with_capacity(local.len());
    let mut in_separator_run = false;
    for ch in local.chars() {
        if matches!(ch, '.' | '_' | '-') {
            if !in_separator_run {
                spaced.push(' ');
            }
            in_separator_run = true;
        } else {
            spaced.push(ch);
            in_separator_run = false;
        }
    }

    let mut name = String::with_capacity(spaced.len());
    let mut previous_is_word = false;
    for ch in spaced.chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && !previous_is_word {
            name.extend(ch.to_uppercase());
        } else {
            name.push(ch);
        }
        previous_is_word = is_word;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, email: Option<&str>) -> RawSession {
        RawSession {
            name: name.to_string(),
            email: email.map(str::to_string),
            provider: ProviderId::Email,
            communities: Vec::new(),
        }
    }

    #[test]
    fn test_normalizes_email_and_attaches_memberships() {
        let session = normalize_session(&raw("Ana", Some("  Ana@Alumni.UNAV.es ")), None);
        assert_eq!(session.email, "ana@alumni.unav.es");
        assert_eq!(session.name, "Ana");
        let ids: Vec<_> = session.communities.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["fg-global", "fg-emea", "fg-uni-navarra"]);
    }

    #[test]
    fn test_falls_back_to_fallback_email() {
        let session = normalize_session(&raw("Demo", None), Some("Demo@LinkedIn.com"));
        assert_eq!(session.email, "demo@linkedin.com");

        let session = normalize_session(&raw("Demo", Some("")), Some("x@example.jp"));
        assert_eq!(session.email, "x@example.jp");
        assert_eq!(session.communities[1].id, "fg-asia");
    }

    #[test]
    fn test_keeps_existing_communities() {
        let mut payload = raw("Lee", Some("lee@example.jp"));
        payload.provider = ProviderId::LinkedinDemo;
        payload.communities = vec![CommunityMembership::new("fg-quant", "Quant Desk")];

        let session = normalize_session(&payload, None);
        assert_eq!(session.provider, ProviderId::LinkedinDemo);
        let ids: Vec<_> = session.communities.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["fg-global", "fg-asia", "fg-quant"]);
    }

    #[test]
    fn test_no_email_at_all() {
        let session = normalize_session(&raw("Ghost", None), None);
        assert_eq!(session.email, "");
        assert_eq!(session.communities, vec![CommunityMembership::global()]);
    }

    #[test]
    fn test_blank_name_is_derived() {
        let session = normalize_session(&raw("  ", Some("jane.doe@example.com")), None);
        assert_eq!(session.name, "Jane Doe");
    }

    #[test]
    fn test_derive_name_from_email() {
        assert_eq!(derive_name_from_email("jane.doe@x.com"), "Jane Doe");
        assert_eq!(derive_name_from_email("mary__ann-lee@x.com"), "Mary Ann Lee");
        assert_eq!(derive_name_from_email("@x.com"), "Financegram Member");
        assert_eq!(derive_name_from_email(""), "Financegram Member");
        assert_eq!(derive_name_from_email("bob"), "Bob");
    }

    #[test]
    fn test_provider_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProviderId::LinkedinDemo).unwrap(),
            "\"linkedin-demo\""
        );
        let payload: RawSession =
            serde_json::from_str(r#"{"name":"A","email":"a@b.es","provider":"email"}"#).unwrap();
        assert_eq!(payload.provider, ProviderId::Email);
        assert!(payload.communities.is_empty());
    }
}
