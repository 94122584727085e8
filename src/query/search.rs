//! Weighted fuzzy text search
//!
//! Scores a task against a query across its text fields. A field hit is
//! either a substring (scored by how early it appears) or an in-order
//! character subsequence (scored by how tightly the characters cluster).
//! Field scores are weighted so a title hit always outranks the same hit
//! in a description or comment, and anything below the cutoff is treated
//! as no match at all.

use crate::domain::Task;

const WEIGHT_TITLE: f64 = 1.0;
const WEIGHT_ASSIGNEE: f64 = 0.8;
const WEIGHT_DESCRIPTION: f64 = 0.7;
const WEIGHT_COMMENT: f64 = 0.5;

/// Minimum weighted score for a task to count as a match
const SCORE_CUTOFF: f64 = 0.3;

/// Returns the task's relevance for the query, or `None` below the cutoff
///
/// Scores fall in `(0.0, 1.0]`; a query matching the start of the title
/// scores 1.0. A blank query matches nothing.
pub fn score(task: &Task, query: &str) -> Option<f64> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut best = WEIGHT_TITLE * field_score(&task.title, &needle);

    if let Some(assignee) = &task.assignee {
        best = best.max(WEIGHT_ASSIGNEE * field_score(assignee, &needle));
    }
    if let Some(description) = &task.description {
        best = best.max(WEIGHT_DESCRIPTION * field_score(description, &needle));
    }
    for comment in &task.comments {
        best = best.max(WEIGHT_COMMENT * field_score(&comment.content, &needle));
    }

    if best >= SCORE_CUTOFF {
        Some(best)
    } else {
        None
    }
}

/// Returns true if the task clears the relevance cutoff for the query
pub fn matches(task: &Task, query: &str) -> bool {
    score(task, query).is_some()
}

/// Scores one field against an already-lowercased needle
fn field_score(haystack: &str, needle: &str) -> f64 {
    let haystack = haystack.to_lowercase();

    if let Some(pos) = haystack.find(needle) {
        // Earlier is better: 1.0 at the start, tapering to 0.8
        let ratio = pos as f64 / haystack.len().max(1) as f64;
        return 1.0 - 0.2 * ratio;
    }

    subsequence_score(&haystack, needle)
}

/// Scores an in-order character subsequence by how tightly it clusters
///
/// A subsequence spanning exactly its own length scores 0.7; the score
/// shrinks as the matched characters spread out. No full in-order match
/// scores zero.
fn subsequence_score(haystack: &str, needle: &str) -> f64 {
    let mut needle_chars = needle.chars();
    let mut current = match needle_chars.next() {
        Some(c) => c,
        None => return 0.0,
    };

    let mut first_hit = None;
    let mut last_hit = 0usize;
    let mut matched = 0usize;
    let needle_len = needle.chars().count();

    for (index, c) in haystack.chars().enumerate() {
        if c == current {
            if first_hit.is_none() {
                first_hit = Some(index);
            }
            last_hit = index;
            matched += 1;
            match needle_chars.next() {
                Some(next) => current = next,
                None => break,
            }
        }
    }

    if matched < needle_len {
        return 0.0;
    }

    let span = match first_hit {
        Some(first) => last_hit - first + 1,
        None => return 0.0,
    };

    0.7 * needle_len as f64 / span as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Comment, TaskId};
    use chrono::Utc;

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    #[test]
    fn title_substring_matches() {
        let task = make_task("Deploy the website");
        assert!(matches(&task, "website"));
    }

    #[test]
    fn search_is_case_insensitive() {
        let task = make_task("Deploy the Website");
        assert!(matches(&task, "WEBSITE"));
        assert!(matches(&task, "deploy"));
    }

    #[test]
    fn title_prefix_scores_full_marks() {
        let task = make_task("Deploy");
        assert_eq!(score(&task, "deploy"), Some(1.0));
    }

    #[test]
    fn earlier_substring_scores_higher() {
        let early = make_task("review the design");
        let late = make_task("the design needs review");

        let early_score = score(&early, "review").unwrap();
        let late_score = score(&late, "review").unwrap();
        assert!(early_score > late_score);
    }

    #[test]
    fn subsequence_matches_tight_abbreviations() {
        let task = make_task("Deploy website");
        // d-p-l in "deploy" spans five characters
        assert!(matches(&task, "dpl"));
    }

    #[test]
    fn scattered_subsequence_falls_below_cutoff() {
        let task = make_task("axxxxxxxxxxbxxxxxxxxxxc");
        assert!(!matches(&task, "abc"));
    }

    #[test]
    fn description_and_comments_are_searched() {
        let mut with_description = make_task("First");
        with_description.description = Some("quarterly report".to_string());
        assert!(matches(&with_description, "quarterly"));

        let mut with_comment = make_task("Second");
        with_comment
            .comments
            .push(Comment::new("dana", "blocked on legal review", Utc::now()));
        assert!(matches(&with_comment, "legal"));
    }

    #[test]
    fn assignee_is_searched() {
        let mut task = make_task("Handoff");
        task.assignee = Some("Morgan".to_string());
        assert!(matches(&task, "morgan"));
    }

    #[test]
    fn title_hit_outranks_comment_hit() {
        let in_title = make_task("alpha rollout");
        let mut in_comment = make_task("unrelated");
        in_comment
            .comments
            .push(Comment::new("dana", "alpha rollout notes", Utc::now()));

        let title_score = score(&in_title, "alpha").unwrap();
        let comment_score = score(&in_comment, "alpha").unwrap();
        assert!(title_score > comment_score);
    }

    #[test]
    fn gibberish_does_not_match() {
        let task = make_task("Deploy the website");
        assert!(!matches(&task, "zqxv"));
    }

    #[test]
    fn blank_query_matches_nothing() {
        let task = make_task("Deploy");
        assert_eq!(score(&task, ""), None);
        assert_eq!(score(&task, "   "), None);
    }
}
