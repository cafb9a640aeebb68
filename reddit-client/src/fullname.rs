//! Reddit "things" (comments, posts, etc.) are identified by "fullnames": a
//! short type prefix followed by an opaque ID string. Listing endpoints
//! return bare IDs inside parsed records, but every write endpoint wants the
//! typed form. See <https://www.reddit.com/dev/api/#fullnames>.

const COMMENT_PREFIX: &str = "t1_";
const POST_PREFIX: &str = "t3_";

/// Returns the fullname of a comment given its bare ID.
pub fn comment_fullname(id: &str) -> String {
    format!("{COMMENT_PREFIX}{id}")
}

/// Returns the fullname of a post given its bare ID.
pub fn post_fullname(id: &str) -> String {
    format!("{POST_PREFIX}{id}")
}
