//! Property-based tests for the host reconciliation diff.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;

    use crate::hosts::diff;
    use proptest::prelude::*;

    fn name_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set("[a-e]{1,3}\\.dev", 0..12)
    }

    proptest! {
        /// Property: on canonical input the merge equals the set symmetric difference
        #[test]
        fn diff_matches_symmetric_difference(hosts in name_set(), vhosts in name_set()) {
            let hosts_list: Vec<String> = hosts.iter().cloned().collect();
            let vhosts_list: Vec<String> = vhosts.iter().cloned().collect();

            let result = diff(&hosts_list, &vhosts_list);

            let expected_missing_from_hosts: Vec<String> =
                vhosts.difference(&hosts).cloned().collect();
            let expected_missing_from_vhosts: Vec<String> =
                hosts.difference(&vhosts).cloned().collect();
            prop_assert_eq!(result.missing_from_hosts, expected_missing_from_hosts);
            prop_assert_eq!(result.missing_from_vhosts, expected_missing_from_vhosts);
        }

        /// Property: a list compared with itself has no differences
        #[test]
        fn diff_with_self_is_empty(names in name_set()) {
            let list: Vec<String> = names.into_iter().collect();
            prop_assert!(diff(&list, &list).is_empty());
        }
    }
}
