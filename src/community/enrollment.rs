//! Forum ids assigned to a new account at registration

use crate::community::membership::{CommunityMembership, email_domain};
use crate::models::DEFAULT_COMMUNITY;

const STAFF_DOMAIN: &str = "financegram.com";
const UNIVERSITY_DOMAIN_SUFFIX: &str = "university.edu";

/// Labels for the forum ids handed out here; unknown ids are labelled by id.
const FORUM_LABELS: &[(&str, &str)] = &[
    (DEFAULT_COMMUNITY, "Global Community"),
    ("us-east", "US East Community"),
    ("regional", "Regional Community"),
    ("university-abc", "University ABC Community"),
];

/// Starting forum ids for `email`, global first, no duplicates.
pub fn starting_communities(email: &str) -> Vec<String> {
    let domain = email_domain(email.trim()).to_lowercase();
    let mut communities = vec![DEFAULT_COMMUNITY.to_string()];

    if domain == STAFF_DOMAIN {
        communities.push("us-east".to_string());
    }

    if domain.ends_with(UNIVERSITY_DOMAIN_SUFFIX) {
        communities.push("regional".to_string());
        communities.push("university-abc".to_string());
    }

    communities
}

/// Membership view of a stored forum id.
pub fn membership_for_forum(forum_id: &str) -> CommunityMembership {
    let label = FORUM_LABELS
        .iter()
        .find(|(id, _)| *id == forum_id)
        .map(|(_, label)| *label)
        .unwrap_or(forum_id);
    CommunityMembership::new(forum_id, label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_domain_gets_global_only() {
        assert_eq!(starting_communities("jane@gmail.com"), vec!["global"]);
    }

    #[test]
    fn test_staff_domain() {
        assert_eq!(
            starting_communities("ops@Financegram.com"),
            vec!["global", "us-east"]
        );
        // Subdomains are not staff
        assert_eq!(starting_communities("ops@eu.financegram.com"), vec!["global"]);
    }

    #[test]
    fn test_university_suffix() {
        assert_eq!(
            starting_communities("student@state.university.edu"),
            vec!["global", "regional", "university-abc"]
        );
        assert_eq!(
            starting_communities("student@university.edu"),
            vec!["global", "regional", "university-abc"]
        );
    }

    #[test]
    fn test_membership_labels() {
        assert_eq!(membership_for_forum("global").label, "Global Community");
        assert_eq!(membership_for_forum("fg-custom").label, "fg-custom");
    }
}
