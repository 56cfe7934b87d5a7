//! Custom assertions for filter outcomes

use roster_filter::FilterOutcome;

/// Assert the result uids, in order
pub fn assert_uids(outcome: &FilterOutcome, expected: &[&str]) {
    assert_eq!(
        outcome.uids(),
        expected,
        "unexpected result order; stats: {:?}",
        outcome.stats
    );
}

/// Assert results are sorted by score descending, ties by uid ascending
pub fn assert_score_order(outcome: &FilterOutcome) {
    for pair in outcome.enrollees.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.aggregate_score > b.aggregate_score
                || (a.aggregate_score == b.aggregate_score && a.uid < b.uid),
            "{} ({}) ordered before {} ({})",
            a.uid,
            a.aggregate_score,
            b.uid,
            b.aggregate_score
        );
    }
}
