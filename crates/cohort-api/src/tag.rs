//! Entity-tag computation for the candidates collection.
//!
//! The tag digests the collection's aggregate state: the most recent
//! modification timestamp across active candidates plus the distinct active
//! count. Same criteria in, same tag out; moving either input changes the tag.

use cohort_core::TagCriteria;
use sha2::{Digest, Sha256};

/// Fixed entity-type prefix folded into the digest input, so tags for
/// different collections can never collide on identical criteria.
const TAG_PREFIX: &str = "Candidates";

/// Compute the candidates-collection tag for the given criteria.
///
/// An absent timestamp (empty collection) encodes as the empty string, so an
/// empty collection still has a stable tag.
pub fn candidates_tag(criteria: &TagCriteria) -> String {
  let time = criteria
    .latest_change
    .map(|t| t.to_rfc3339())
    .unwrap_or_default();

  let mut hasher = Sha256::new();
  hasher.update(format!("{TAG_PREFIX}:{time}:{}", criteria.active_count));
  format!("\"{}\"", hex::encode(hasher.finalize()))
}
