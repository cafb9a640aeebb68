use chrono::{DateTime, Utc};
use reddit_client::{Comment, Post};

/// Why an item was preserved rather than shredded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Newer than the cutoff; recent content is never touched.
    CreatedAfterCutoff,
    /// Scores above the configured ceiling are preserved.
    ScoreAboveMax,
}

/// Accessors shared by the shreddable item kinds.
pub trait ShredItem {
    fn created_utc(&self) -> DateTime<Utc>;
    fn score(&self) -> i64;
    fn permalink(&self) -> &str;
}

impl ShredItem for Comment {
    fn created_utc(&self) -> DateTime<Utc> {
        self.created_utc
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn permalink(&self) -> &str {
        &self.permalink
    }
}

impl ShredItem for Post {
    fn created_utc(&self) -> DateTime<Utc> {
        self.created_utc
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn permalink(&self) -> &str {
        &self.permalink
    }
}

/// Retention predicate; `None` means the item is eligible for shredding.
/// The age check runs before the score check, which fixes the reported
/// reason when both would apply.
pub fn eligibility(
    item: &impl ShredItem,
    before: DateTime<Utc>,
    max_score: Option<i64>,
) -> Option<SkipReason> {
    if item.created_utc() > before {
        return Some(SkipReason::CreatedAfterCutoff);
    }
    if let Some(max) = max_score {
        if item.score() > max {
            return Some(SkipReason::ScoreAboveMax);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(created_utc: i64, score: i64) -> Comment {
        Comment {
            id: "abc".to_string(),
            body: "body".to_string(),
            permalink: "/r/test/comments/x/abc/".to_string(),
            subreddit: "test".to_string(),
            score,
            created_utc: DateTime::from_timestamp(created_utc, 0).unwrap(),
        }
    }

    fn cutoff(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn test_newer_than_cutoff_is_skipped_regardless_of_score() {
        let item = comment(2000, -100);
        assert_eq!(
            eligibility(&item, cutoff(1000), None),
            Some(SkipReason::CreatedAfterCutoff)
        );
        assert_eq!(
            eligibility(&item, cutoff(1000), Some(1_000_000)),
            Some(SkipReason::CreatedAfterCutoff)
        );
    }

    #[test]
    fn test_score_above_max_is_skipped_regardless_of_age() {
        let item = comment(10, 500);
        assert_eq!(
            eligibility(&item, cutoff(1000), Some(499)),
            Some(SkipReason::ScoreAboveMax)
        );
    }

    #[test]
    fn test_age_check_runs_before_score_check() {
        // Both rules would reject; the reported reason is the age one.
        let item = comment(2000, 500);
        assert_eq!(
            eligibility(&item, cutoff(1000), Some(1)),
            Some(SkipReason::CreatedAfterCutoff)
        );
    }

    #[test]
    fn test_old_low_score_item_is_eligible() {
        let item = comment(10, 1);
        assert_eq!(eligibility(&item, cutoff(1000), Some(5)), None);
    }

    #[test]
    fn test_no_score_ceiling_means_any_score_is_eligible() {
        let item = comment(10, 1_000_000);
        assert_eq!(eligibility(&item, cutoff(1000), None), None);
    }

    #[test]
    fn test_boundary_values_are_eligible() {
        // Exactly at the cutoff or exactly at the max score is not "after"
        // or "above", so the item is shredded.
        let item = comment(1000, 5);
        assert_eq!(eligibility(&item, cutoff(1000), Some(5)), None);
    }
}
