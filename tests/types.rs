// ABOUTME: Integration tests for type-safe identifiers and validated types.
// ABOUTME: Tests namespace name validation and the reset decision as properties.

use deployprobe::lifecycle::{ResetDecision, UNREADABLE_ATTEMPTS, reset_decision};
use deployprobe::types::*;
use proptest::prelude::*;

mod namespace_name_tests {
    use super::*;

    #[test]
    fn accepts_dns_labels() {
        assert_eq!(
            NamespaceName::new("health-check").unwrap().as_str(),
            "health-check"
        );
        assert!(NamespaceName::new("probe-01").is_ok());
        assert!(NamespaceName::new("a").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(NamespaceName::new(""), Err(NamespaceNameError::Empty));
    }

    #[test]
    fn rejects_too_long() {
        let name = "a".repeat(64);
        assert_eq!(NamespaceName::new(&name), Err(NamespaceNameError::TooLong));
        assert!(NamespaceName::new(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn rejects_edge_hyphens() {
        assert_eq!(
            NamespaceName::new("-probe"),
            Err(NamespaceNameError::StartsWithHyphen)
        );
        assert_eq!(
            NamespaceName::new("probe-"),
            Err(NamespaceNameError::EndsWithHyphen)
        );
    }

    #[test]
    fn rejects_uppercase_and_punctuation() {
        assert_eq!(
            NamespaceName::new("Health"),
            Err(NamespaceNameError::NotLowercase)
        );
        assert_eq!(
            NamespaceName::new("health_check"),
            Err(NamespaceNameError::InvalidChar('_'))
        );
        assert_eq!(
            NamespaceName::new("health.check"),
            Err(NamespaceNameError::InvalidChar('.'))
        );
    }

    #[test]
    fn rejects_platform_namespaces() {
        for name in ["default", "openshift", "kube-system", "openshift-monitoring"] {
            assert_eq!(
                NamespaceName::new(name),
                Err(NamespaceNameError::Reserved(name.to_string()))
            );
        }
        assert!(NamespaceName::new("kubernetes-probe").is_ok());
    }

    #[test]
    fn deserializes_with_validation() {
        let ok: NamespaceName = serde_yaml::from_str("health-check").unwrap();
        assert_eq!(ok.to_string(), "health-check");
        assert!(serde_yaml::from_str::<NamespaceName>("Not_Valid").is_err());
    }
}

mod id_tests {
    use super::*;

    #[test]
    fn build_pod_name_derives_from_build() {
        let build = BuildName::numbered("check-website-bc", 3);
        assert_eq!(build.as_str(), "check-website-bc-3");
        assert_eq!(build.pod_name().as_str(), "check-website-bc-3-build");
    }

    #[test]
    fn pod_names_compare_by_value() {
        assert_eq!(PodName::new("a-1"), PodName::new(String::from("a-1")));
        assert_ne!(PodName::new("a-1"), PodName::new("a-2"));
    }
}

proptest! {
    #[test]
    fn valid_labels_are_accepted(name in "[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?") {
        prop_assume!(!name.starts_with("kube-") && !name.starts_with("openshift"));
        prop_assume!(name != "default");
        prop_assert!(NamespaceName::new(&name).is_ok());
    }

    #[test]
    fn names_with_uppercase_are_rejected(prefix in "[a-z]{0,10}", upper in "[A-Z]", suffix in "[a-z]{0,10}") {
        let name = format!("{prefix}{upper}{suffix}");
        prop_assert_eq!(NamespaceName::new(&name), Err(NamespaceNameError::NotLowercase));
    }

    #[test]
    fn reset_exactly_at_threshold(max in 1u32..10_000, attempts in 0u32..20_000) {
        let expected = if attempts >= max { ResetDecision::Reset } else { ResetDecision::Reuse };
        prop_assert_eq!(reset_decision(attempts, max), expected);
    }

    #[test]
    fn zero_threshold_always_reuses(attempts in any::<u32>()) {
        prop_assert_eq!(reset_decision(attempts, 0), ResetDecision::Reuse);
    }

    #[test]
    fn unreadable_ledger_resets_for_any_threshold(max in 1u32..) {
        prop_assert_eq!(reset_decision(UNREADABLE_ATTEMPTS, max), ResetDecision::Reset);
    }
}
