//! Forum memberships derived from an email domain
//!
//! Every user belongs to the global forum, to one regional forum chosen by
//! the email's top-level domain, and optionally to a university forum when
//! the full domain is a known campus domain.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const GLOBAL_FORUM_ID: &str = "fg-global";
pub const GLOBAL_FORUM_LABEL: &str = "Financegram - Global Forum";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommunityMembership {
    pub id: String,
    pub label: String,
}

impl CommunityMembership {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn global() -> Self {
        Self::new(GLOBAL_FORUM_ID, GLOBAL_FORUM_LABEL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Emea,
    Usa,
    Asia,
}

/// Region used when the TLD is not in [`TLD_REGIONS`].
pub const DEFAULT_REGION: Region = Region::Emea;

impl Region {
    pub fn id(&self) -> &'static str {
        match self {
            Region::Emea => "fg-emea",
            Region::Usa => "fg-usa",
            Region::Asia => "fg-asia",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Emea => "Financegram - EMEA Forum",
            Region::Usa => "Financegram - USA Forum",
            Region::Asia => "Financegram - Asia Forum",
        }
    }

    pub fn membership(&self) -> CommunityMembership {
        CommunityMembership::new(self.id(), self.label())
    }

    pub fn from_tld(tld: &str) -> Option<Region> {
        TLD_REGIONS
            .iter()
            .find(|(candidate, _)| *candidate == tld)
            .map(|(_, region)| *region)
    }
}

const TLD_REGIONS: &[(&str, Region)] = &[
    ("es", Region::Emea),
    ("fr", Region::Emea),
    ("uk", Region::Emea),
    ("de", Region::Emea),
    ("it", Region::Emea),
    ("pt", Region::Emea),
    ("ie", Region::Emea),
    ("eu", Region::Emea),
    ("edu", Region::Usa),
    ("us", Region::Usa),
    ("ca", Region::Usa),
    ("mx", Region::Usa),
    ("jp", Region::Asia),
    ("sg", Region::Asia),
    ("cn", Region::Asia),
    ("hk", Region::Asia),
    ("au", Region::Asia),
    ("in", Region::Asia),
];

#[derive(Debug, Clone, Copy)]
pub struct UniversityForum {
    pub domain: &'static str,
    pub id: &'static str,
    pub label: &'static str,
    pub region: Region,
}

impl UniversityForum {
    pub fn membership(&self) -> CommunityMembership {
        CommunityMembership::new(self.id, self.label)
    }
}

const UNIVERSITY_FORUMS: &[UniversityForum] = &[
    UniversityForum {
        domain: "alumni.unav.es",
        id: "fg-uni-navarra",
        label: "Financegram - University of Navarra Forum",
        region: Region::Emea,
    },
    UniversityForum {
        domain: "unav.es",
        id: "fg-uni-navarra",
        label: "Financegram - University of Navarra Forum",
        region: Region::Emea,
    },
];

/// Exact-match lookup; subdomains of a listed domain do not match.
pub fn university_for_domain(domain: &str) -> Option<&'static UniversityForum> {
    UNIVERSITY_FORUMS.iter().find(|forum| forum.domain == domain)
}

/// Text after the first `@`, or empty.
pub fn email_domain(email: &str) -> &str {
    email.split('@').nth(1).unwrap_or("")
}

pub fn region_for_email(email: &str) -> Region {
    let domain = email_domain(email);
    let tld = domain.rsplit('.').next().unwrap_or("").to_lowercase();
    Region::from_tld(&tld).unwrap_or(DEFAULT_REGION)
}

/// Keep the first occurrence of each id, preserving order.
pub fn dedupe_memberships<I>(entries: I) -> Vec<CommunityMembership>
where
    I: IntoIterator<Item = CommunityMembership>,
{
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect()
}

/// Resolve the memberships for `email`, merged with `existing`.
///
/// Order is `[global, region, university?, ...existing]` with duplicate ids
/// dropped. A blank email yields `existing` unchanged, or just the global
/// forum when there is nothing to keep.
pub fn build_community_memberships(
    email: &str,
    existing: &[CommunityMembership],
) -> Vec<CommunityMembership> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return if existing.is_empty() {
            vec![CommunityMembership::global()]
        } else {
            existing.to_vec()
        };
    }

    let university = university_for_domain(email_domain(&email));
    let region = university
        .map(|forum| forum.region)
        .unwrap_or_else(|| region_for_email(&email));

    let mut memberships = vec![CommunityMembership::global(), region.membership()];
    if let Some(forum) = university {
        memberships.push(forum.membership());
    }
    memberships.extend(existing.iter().cloned());

    dedupe_memberships(memberships)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(memberships: &[CommunityMembership]) -> Vec<&str> {
        memberships.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_navarra_alumni() {
        let result = build_community_memberships("user@alumni.unav.es", &[]);
        assert_eq!(ids(&result), vec!["fg-global", "fg-emea", "fg-uni-navarra"]);
        assert_eq!(result[2].label, "Financegram - University of Navarra Forum");
    }

    #[test]
    fn test_japanese_domain_is_asia_only() {
        let result = build_community_memberships("user@example.jp", &[]);
        assert_eq!(ids(&result), vec!["fg-global", "fg-asia"]);
    }

    #[test]
    fn test_unmapped_tld_defaults_to_emea() {
        let result = build_community_memberships("someone@example.com", &[]);
        assert_eq!(ids(&result), vec!["fg-global", "fg-emea"]);
    }

    #[test]
    fn test_email_is_trimmed_and_lowercased() {
        let result = build_community_memberships("  Student@UNAV.ES ", &[]);
        assert_eq!(ids(&result), vec!["fg-global", "fg-emea", "fg-uni-navarra"]);

        let result = build_community_memberships("Prof@Stanford.EDU", &[]);
        assert_eq!(ids(&result), vec!["fg-global", "fg-usa"]);
    }

    #[test]
    fn test_university_subdomain_not_matched() {
        let result = build_community_memberships("user@cs.unav.es", &[]);
        assert_eq!(ids(&result), vec!["fg-global", "fg-emea"]);
    }

    #[test]
    fn test_empty_email() {
        assert_eq!(
            build_community_memberships("   ", &[]),
            vec![CommunityMembership::global()]
        );

        let existing = vec![CommunityMembership::new("fg-usa", "Financegram - USA Forum")];
        assert_eq!(build_community_memberships("", &existing), existing);
    }

    #[test]
    fn test_existing_appended_after_derived() {
        let existing = vec![
            CommunityMembership::new("fg-options", "Options Desk"),
            CommunityMembership::new("fg-asia", "stale label"),
        ];
        let result = build_community_memberships("trader@example.sg", &existing);
        assert_eq!(ids(&result), vec!["fg-global", "fg-asia", "fg-options"]);
        assert_eq!(result[1].label, "Financegram - Asia Forum");
    }

    #[test]
    fn test_global_always_first_and_unique() {
        let emails = [
            "a@b.es",
            "a@b.jp",
            "a@b.edu",
            "a@alumni.unav.es",
            "no-at-sign",
            "a@",
            "a@b.c.d.hk",
        ];
        for email in emails {
            let result =
                build_community_memberships(email, &[CommunityMembership::global()]);
            assert_eq!(result[0].id, GLOBAL_FORUM_ID, "email {}", email);
            assert_eq!(
                result.iter().filter(|m| m.id == GLOBAL_FORUM_ID).count(),
                1,
                "email {}",
                email
            );
        }
    }

    #[test]
    fn test_resolver_is_idempotent() {
        for email in ["user@alumni.unav.es", "user@example.jp", "x@y.com", ""] {
            let once = build_community_memberships(email, &[]);
            let twice = build_community_memberships(email, &once);
            assert_eq!(once, twice, "email {}", email);
        }
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let result = dedupe_memberships(vec![
            CommunityMembership::new("a", "first"),
            CommunityMembership::new("b", "b"),
            CommunityMembership::new("a", "second"),
        ]);
        assert_eq!(ids(&result), vec!["a", "b"]);
        assert_eq!(result[0].label, "first");
    }
}
