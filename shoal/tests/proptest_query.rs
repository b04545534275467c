//! Property tests for query construction and mode selection

use proptest::prelude::*;
use shoal::{DispatchMode, QueryArgs, QueryRequest};

fn bin_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,13}"
}

proptest! {
    #[test]
    fn building_twice_yields_identical_query(
        namespace in "[a-z]{1,10}",
        set in proptest::option::of("[a-z]{1,10}"),
        bins in proptest::collection::vec(bin_name(), 0..6),
        bin in bin_name(),
        start in any::<i64>(),
        end in any::<i64>(),
        use_range in any::<bool>(),
    ) {
        let (equal, range) = if use_range {
            (None, Some(vec![bin.clone(), start.to_string(), end.to_string()]))
        } else {
            (Some(vec![bin.clone(), start.to_string()]), None)
        };
        let args = QueryArgs {
            namespace,
            set,
            bins: Some(bins.clone()),
            equal,
            range,
            ..Default::default()
        };

        let first = QueryRequest::from_args(args.clone()).unwrap();
        let second = QueryRequest::from_args(args).unwrap();
        prop_assert_eq!(first.build_query(), second.build_query());
        prop_assert_eq!(first.build_query(), first.build_query());
        prop_assert_eq!(first.build_query().bins, bins);
    }

    #[test]
    fn short_udf_lists_select_foreground(
        udf in proptest::collection::vec("[a-z]{1,8}", 0..2),
        background in any::<bool>(),
    ) {
        let request = QueryRequest::from_args(QueryArgs {
            namespace: "test".into(),
            udf: Some(udf),
            background,
            ..Default::default()
        })
        .unwrap();
        prop_assert!(request.udf.is_none());
        prop_assert_eq!(request.mode(), DispatchMode::Foreground);
    }

    #[test]
    fn both_filters_always_rejected(
        bin in bin_name(),
        value in any::<i64>(),
        start in any::<i64>(),
        end in any::<i64>(),
    ) {
        let result = QueryRequest::from_args(QueryArgs {
            namespace: "test".into(),
            equal: Some(vec![bin.clone(), value.to_string()]),
            range: Some(vec![bin, start.to_string(), end.to_string()]),
            ..Default::default()
        });
        prop_assert!(result.is_err());
    }
}
