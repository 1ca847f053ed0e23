
use crate::{
    bucket::{BucketMapError, BucketMapMode, BucketNodeMap},
    error::ErrorClass,
    node::NodeId,
    obs::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink},
    placement::{PlacementError, PlacementStrategy, RoundRobinPlacement},
};
use std::{
    collections::{BTreeMap, HashMap},
    num::NonZeroU32,
};

fn node(n: u128) -> NodeId {
    NodeId::from_u128(n)
}

fn dense(count: i32) -> BTreeMap<i32, NodeId> {
    (0..count)
        .map(|b| (b, node(u128::from(b.unsigned_abs()) % 3)))
        .collect()
}

//
// Dynamic
//

#[test]
fn dynamic_keeps_bucket_count() {
    let map = BucketNodeMap::<NodeId>::dynamic(16).expect("positive count should build");

    assert_eq!(map.bucket_count(), 16);
    assert!(!map.has_fixed_mapping());
    assert_eq!(map.mode(), BucketMapMode::Dynamic);
    assert!(map.as_fixed().is_none());
}

#[test]
fn dynamic_rejects_zero_and_negative_counts() {
    for bucket_count in [0, -1, i32::MIN] {
        let err = BucketNodeMap::<NodeId>::dynamic(bucket_count).unwrap_err();

        assert_eq!(
            err,
            BucketMapError::NonPositiveBucketCount {
                bucket_count: i64::from(bucket_count)
            }
        );
        assert_eq!(err.class(), ErrorClass::InvalidArgument);
        assert!(err.to_string().contains("bucket count must be positive"));
    }
}

#[test]
fn dynamic_fixed_mapping_is_illegal_state_every_time() {
    let map = BucketNodeMap::<NodeId>::dynamic(4).expect("positive count should build");

    for _ in 0..3 {
        let err = map.fixed_mapping().unwrap_err();
        assert_eq!(err, BucketMapError::NoFixedMapping);
        assert_eq!(err.class(), ErrorClass::IllegalState);
        assert_eq!(err.to_string(), "no fixed bucket-to-node mapping present");
    }
}

//
// Fixed
//

#[test]
fn fixed_two_node_example() {
    let (a, b) = (node(0xA), node(0xB));
    let input = BTreeMap::from([(0, a), (1, b)]);

    let map = BucketNodeMap::fixed(&input).expect("dense mapping should build");

    assert_eq!(map.bucket_count(), 2);
    assert!(map.has_fixed_mapping());
    assert_eq!(map.mode(), BucketMapMode::Fixed);

    let mapping = map.fixed_mapping().expect("fixed descriptor has a mapping");
    assert_eq!(mapping.to_map(), BTreeMap::from([(0, a), (1, b)]));
    assert_eq!(mapping.node(0), Some(&a));
    assert_eq!(mapping.node(1), Some(&b));
}

#[test]
fn fixed_accepts_hash_map_input() {
    let input: HashMap<i32, String> = (0..5).map(|b| (b, format!("worker-{b}"))).collect();

    let map = BucketNodeMap::fixed(&input).expect("dense mapping should build");

    assert_eq!(map.bucket_count(), 5);
    let mapping = map.fixed_mapping().expect("fixed descriptor has a mapping");
    for (bucket, owner) in mapping.iter() {
        assert_eq!(owner, &format!("worker-{bucket}"));
    }
}

#[test]
fn fixed_rejects_empty_mapping() {
    let input = BTreeMap::<i32, NodeId>::new();

    let err = BucketNodeMap::fixed(&input).unwrap_err();

    assert_eq!(err, BucketMapError::EmptyMapping);
    assert_eq!(err.to_string(), "bucket-to-node mapping is empty");
}

#[test]
fn fixed_rejects_missing_mapping() {
    let err = BucketNodeMap::fixed_opt::<&BTreeMap<i32, NodeId>>(None).unwrap_err();

    assert_eq!(err, BucketMapError::MissingMapping);
    assert_eq!(err.class(), ErrorClass::InvalidArgument);
}

#[test]
fn fixed_opt_with_mapping_matches_fixed() {
    let input = dense(3);

    let via_opt = BucketNodeMap::fixed_opt(Some(&input)).expect("dense mapping should build");
    let direct = BucketNodeMap::fixed(&input).expect("dense mapping should build");

    assert_eq!(via_opt, direct);
}

#[test]
fn fixed_reports_negative_bucket_value() {
    let input = BTreeMap::from([(-7, node(1)), (0, node(2)), (1, node(3))]);

    let err = BucketNodeMap::fixed(&input).unwrap_err();

    assert_eq!(err, BucketMapError::NegativeBucket { bucket: -7 });
    assert!(err.to_string().contains("-7"));
}

#[test]
fn negative_bucket_wins_over_count_mismatch() {
    // Keys {-1, 5}: also sparse, but the negative key is reported first.
    let input = BTreeMap::from([(-1, node(1)), (5, node(2))]);

    let err = BucketNodeMap::fixed(&input).unwrap_err();

    assert_eq!(err, BucketMapError::NegativeBucket { bucket: -1 });
}

#[test]
fn fixed_rejects_gap_with_both_counts() {
    let input = BTreeMap::from([(0, node(1)), (1, node(2)), (3, node(3))]);

    let err = BucketNodeMap::fixed(&input).unwrap_err();

    assert_eq!(
        err,
        BucketMapError::MismatchedBucketCount {
            entries: 3,
            bucket_count: 4
        }
    );
    let message = err.to_string();
    assert!(message.contains("(3)"));
    assert!(message.contains("(4)"));
}

#[test]
fn fixed_rejects_single_high_bucket() {
    let input = BTreeMap::from([(9, node(1))]);

    let err = BucketNodeMap::fixed(&input).unwrap_err();

    assert_eq!(
        err,
        BucketMapError::MismatchedBucketCount {
            entries: 1,
            bucket_count: 10
        }
    );
}

#[test]
fn fixed_rejects_repeated_keys_from_pair_list() {
    let pairs = [(0, node(1)), (0, node(2)), (2, node(3))];

    let err = BucketNodeMap::fixed(pairs.iter().map(|(bucket, owner)| (bucket, owner))).unwrap_err();

    assert_eq!(
        err,
        BucketMapError::MismatchedBucketCount {
            entries: 2,
            bucket_count: 3
        }
    );
}

#[test]
fn fixed_handles_max_bucket_number() {
    let input = BTreeMap::from([(crate::MAX_BUCKET_NUMBER, node(1))]);

    let err = BucketNodeMap::fixed(&input).unwrap_err();

    assert_eq!(
        err,
        BucketMapError::MismatchedBucketCount {
            entries: 1,
            bucket_count: i64::from(i32::MAX) + 1
        }
    );
}

#[test]
fn fixed_is_isolated_from_caller_mutation() {
    let mut input = dense(4);
    let map = BucketNodeMap::fixed(&input).expect("dense mapping should build");
    let before = map.fixed_mapping().expect("fixed").to_map();

    input.insert(0, node(99));
    input.insert(4, node(100));
    input.remove(&1);

    let after = map.fixed_mapping().expect("fixed").to_map();
    assert_eq!(before, after);
    assert_eq!(after.get(&0), Some(&node(0)));
    assert_eq!(map.bucket_count(), 4);
}

#[test]
fn equal_inputs_build_equal_descriptors() {
    let left = BucketNodeMap::fixed(&dense(6)).expect("dense mapping should build");
    let right = BucketNodeMap::fixed(&dense(6)).expect("dense mapping should build");

    assert_eq!(left, right);
    assert_ne!(left, BucketNodeMap::dynamic(6).expect("positive count should build"));
}

#[test]
fn descriptor_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BucketNodeMap<NodeId>>();

    let map = std::sync::Arc::new(BucketNodeMap::fixed(&dense(8)).expect("dense mapping"));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let map = std::sync::Arc::clone(&map);
            std::thread::spawn(move || map.fixed_mapping().map(|m| m.len()).unwrap_or(0))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("reader thread should finish"), 8);
    }
}

//
// Resolve
//

#[test]
fn resolve_fixed_ignores_strategy_and_nodes() {
    let map = BucketNodeMap::fixed(&dense(3)).expect("dense mapping should build");

    let mapping = map
        .resolve(&RoundRobinPlacement, &[])
        .expect("fixed descriptors resolve without nodes");

    assert_eq!(&mapping, map.fixed_mapping().expect("fixed"));
}

#[test]
fn resolve_dynamic_places_every_bucket() {
    let map = BucketNodeMap::dynamic(7).expect("positive count should build");
    let nodes = [node(1), node(2), node(3)];

    let mapping = map
        .resolve(&RoundRobinPlacement, &nodes)
        .expect("placement over live nodes should succeed");

    assert_eq!(mapping.len(), 7);
    assert_eq!(mapping.distinct_nodes().len(), 3);
}

#[test]
fn resolve_dynamic_without_nodes_fails() {
    let map = BucketNodeMap::<NodeId>::dynamic(2).expect("positive count should build");

    let err = map.resolve(&RoundRobinPlacement, &[]).unwrap_err();

    assert_eq!(err, PlacementError::NoNodes { bucket_count: 2 });
}

#[test]
fn resolve_rejects_short_placement() {
    struct Truncating;

    impl PlacementStrategy<NodeId> for Truncating {
        fn name(&self) -> &'static str {
            "truncating"
        }

        fn place(
            &self,
            _bucket_count: NonZeroU32,
            nodes: &[NodeId],
        ) -> Result<crate::bucket::FixedMapping<NodeId>, PlacementError> {
            Ok(crate::bucket::FixedMapping::from_dense(nodes.to_vec()))
        }
    }

    let map = BucketNodeMap::dynamic(4).expect("positive count should build");
    let err = map.resolve(&Truncating, &[node(1)]).unwrap_err();

    assert_eq!(
        err,
        PlacementError::WrongBucketCount {
            strategy: "truncating",
            expected: 4,
            actual: 1,
        }
    );
}

//
// Serde
//

#[test]
fn serde_fixed_shape() {
    let input = BTreeMap::from([(0, "a".to_string()), (1, "b".to_string())]);
    let map = BucketNodeMap::fixed(&input).expect("dense mapping should build");

    let json = serde_json::to_value(&map).expect("descriptor should serialize");

    assert_eq!(
        json,
        serde_json::json!({ "bucket_count": 2, "bucket_to_node": { "0": "a", "1": "b" } })
    );
    let back: BucketNodeMap<String> = serde_json::from_value(json).expect("should decode");
    assert_eq!(back, map);
}

#[test]
fn serde_dynamic_omits_mapping() {
    let map = BucketNodeMap::<NodeId>::dynamic(12).expect("positive count should build");

    let json = serde_json::to_string(&map).expect("descriptor should serialize");

    assert_eq!(json, r#"{"bucket_count":12}"#);
    let back: BucketNodeMap<NodeId> = serde_json::from_str(&json).expect("should decode");
    assert_eq!(back, map);
}

#[test]
fn serde_decode_runs_factory_validation() {
    let cases = [
        (r#"{"bucket_count":0}"#, "bucket count must be positive"),
        (r"{}", "bucket-to-node mapping is null"),
        (r#"{"bucket_to_node":null}"#, "bucket-to-node mapping is null"),
        (r#"{"bucket_to_node":{}}"#, "bucket-to-node mapping is empty"),
        (
            r#"{"bucket_to_node":{"-2":"x","0":"y"}}"#,
            "bucket number must be non-negative: -2",
        ),
        (
            r#"{"bucket_to_node":{"0":"x","2":"y"}}"#,
            "mismatched bucket count",
        ),
        (
            r#"{"bucket_count":5,"bucket_to_node":{"0":"x","1":"y"}}"#,
            "mismatched bucket count",
        ),
    ];

    for (json, expected) in cases {
        let err = serde_json::from_str::<BucketNodeMap<String>>(json).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "decoding {json} gave '{err}', expected '{expected}'"
        );
    }
}

#[test]
fn serde_decode_without_mapping_needs_no_node_default() {
    // Generic node types without `Default` still decode.
    let map: BucketNodeMap<NodeId> =
        serde_json::from_str(r#"{"bucket_count":3}"#).expect("dynamic record should decode");

    assert_eq!(map.bucket_count(), 3);
    assert!(!map.has_fixed_mapping());
}

#[test]
fn serde_decode_with_matching_declared_count() {
    let map: BucketNodeMap<String> =
        serde_json::from_str(r#"{"bucket_count":2,"bucket_to_node":{"0":"x","1":"y"}}"#)
            .expect("consistent record should decode");

    assert_eq!(map.bucket_count(), 2);
    assert!(map.has_fixed_mapping());
}

#[test]
fn serde_declared_count_mismatch_is_counted_as_rejection() {
    let sink = Capture::default();

    let decoded = with_metrics_sink(&sink, || {
        serde_json::from_str::<BucketNodeMap<String>>(
            r#"{"bucket_count":5,"bucket_to_node":{"0":"x","1":"y"}}"#,
        )
    });

    let err = decoded.unwrap_err();
    assert!(err.to_string().contains("(2)") && err.to_string().contains("(5)"));
    assert_eq!(
        *sink.events.borrow(),
        vec![MetricsEvent::MapRejected {
            reason: "mismatched_bucket_count"
        }]
    );
}

#[test]
fn serde_declared_count_mismatch_leaves_build_counters_untouched() {
    metrics_reset_all();

    let _ = serde_json::from_str::<BucketNodeMap<String>>(
        r#"{"bucket_count":5,"bucket_to_node":{"0":"x","1":"y"}}"#,
    );

    let report = metrics_report();
    assert_eq!(report.counters.fixed_built, 0);
    assert_eq!(report.counters.rejected, 1);
    assert_eq!(report.rejections.get("mismatched_bucket_count"), Some(&1));
}

#[derive(Default)]
struct Capture {
    events: std::cell::RefCell<Vec<MetricsEvent>>,
}

impl MetricsSink for Capture {
    fn record(&self, event: MetricsEvent) {
        self.events.borrow_mut().push(event);
    }
}
