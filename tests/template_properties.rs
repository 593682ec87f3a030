//! Capture and substitution round-trip.

use proptest::prelude::*;
use resource_router::template::{compile, RemainingPath};

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

proptest! {
    #[test]
    fn test_captured_variables_expand_to_matched_prefix(
        literal in segment(),
        first in segment(),
        second in segment(),
        rest in proptest::collection::vec(segment(), 0..3),
    ) {
        let template = compile(&format!("/{literal}/{{a}}/x/{{b}}")).unwrap();
        let mut path = format!("/{literal}/{first}/x/{second}");
        for part in &rest {
            path.push('/');
            path.push_str(part);
        }

        let matched = template.match_path(&RemainingPath::new(&path)).unwrap();
        let variables = matched.variables().to_vec();
        let expanded = template
            .expand(|name| variables.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone()))
            .unwrap();

        prop_assert_eq!(expanded.as_str(), matched.matched());
        prop_assert!(path.starts_with(&expanded));
    }

    #[test]
    fn test_unmatched_paths_have_no_result(literal in segment(), other in segment()) {
        prop_assume!(literal != other);
        let template = compile(&format!("/{literal}")).unwrap();
        let path = format!("/{other}");
        prop_assert!(template.match_path(&RemainingPath::new(&path)).is_none());
    }
}
