//! Community membership derivation
//!
//! - `membership` - resolver from email domain to forum memberships
//! - `session`    - canonical session shape built from a provider payload
//! - `enrollment` - forum ids stored on an account at registration

pub mod enrollment;
pub mod membership;
pub mod session;

pub use enrollment::{membership_for_forum, starting_communities};
pub use membership::{
    CommunityMembership, GLOBAL_FORUM_ID, Region, build_community_memberships,
    dedupe_memberships,
};
pub use session::{ProviderId, RawSession, Session, derive_name_from_email, normalize_session};
