//! priority allocation.
//!
//! priorities order rule evaluation, lower first. automatic allocation
//! appends: a new rule lands after everything already on the target.
//! explicit priorities are taken verbatim, duplicates included, and
//! gaps are never compacted.

/// the priority for one appended rule.
///
/// `max(existing) + 1`, or 1 on an empty target.
pub(crate) fn next_priority(current_max: Option<i64>) -> i64 {
    current_max.unwrap_or(0) + 1
}

/// priorities for a batch of appended rules, in input order.
pub(crate) fn append_priorities(current_max: Option<i64>, count: usize) -> Vec<i64> {
    let base = current_max.unwrap_or(0);
    (0..count as i64).map(|offset| base + 1 + offset).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rule_gets_one() {
        assert_eq!(next_priority(None), 1);
    }

    #[test]
    fn test_appends_after_max() {
        assert_eq!(next_priority(Some(7)), 8);
        assert_eq!(next_priority(Some(1)), 2);
    }

    #[test]
    fn test_negative_max_still_appends() {
        assert_eq!(next_priority(Some(-5)), -4);
    }

    #[test]
    fn test_batch_preserves_order() {
        assert_eq!(append_priorities(Some(2), 3), vec![3, 4, 5]);
        assert_eq!(append_priorities(None, 2), vec![1, 2]);
        assert!(append_priorities(Some(9), 0).is_empty());
    }
}
