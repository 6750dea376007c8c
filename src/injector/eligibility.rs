// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decides from pod metadata alone whether the sidecar should be injected.

use crate::config::InjectorConfig;
use crate::constants::annotations;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Check whether a pod still needs the agent sidecar.
///
/// Pods in ignored namespaces are never touched. Pods already marked as
/// injected are skipped so that re-admission does not inject twice.
/// Annotation values are compared case-insensitively, keys are not.
pub fn should_inject(meta: &ObjectMeta, config: &InjectorConfig) -> bool {
    let namespace = meta.namespace.as_deref().unwrap_or_default();
    if config.is_ignored_namespace(namespace) {
        return false;
    }

    if is_injected(meta) {
        return false;
    }

    annotation(meta, annotations::INJECT)
        .is_some_and(|v| v.eq_ignore_ascii_case(annotations::INJECT_ENABLED))
}

/// Check whether the status annotation marks the pod as already injected
pub fn is_injected(meta: &ObjectMeta) -> bool {
    annotation(meta, annotations::STATUS)
        .is_some_and(|v| v.eq_ignore_ascii_case(annotations::STATUS_INJECTED))
}

fn annotation<'a>(meta: &'a ObjectMeta, key: &str) -> Option<&'a str> {
    meta.annotations
        .as_ref()
        .and_then(|a| a.get(key))
        .map(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn make_meta(namespace: &str, pairs: &[(&str, &str)]) -> ObjectMeta {
        let annotations = if pairs.is_empty() {
            None
        } else {
            Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            )
        };

        ObjectMeta {
            name: Some("app".to_string()),
            namespace: Some(namespace.to_string()),
            annotations,
            ..Default::default()
        }
    }

    #[test]
    fn test_inject_true() {
        let meta = make_meta("default", &[(annotations::INJECT, "true")]);
        assert!(should_inject(&meta, &InjectorConfig::default()));
    }

    #[test]
    fn test_inject_value_is_case_insensitive() {
        for value in ["TRUE", "True", "tRuE"] {
            let meta = make_meta("default", &[(annotations::INJECT, value)]);
            assert!(should_inject(&meta, &InjectorConfig::default()), "value {}", value);
        }
    }

    #[test]
    fn test_inject_other_values_are_false() {
        for value in ["false", "yes", "1", "", " true"] {
            let meta = make_meta("default", &[(annotations::INJECT, value)]);
            assert!(!should_inject(&meta, &InjectorConfig::default()), "value {:?}", value);
        }
    }

    #[test]
    fn test_no_annotations() {
        let meta = make_meta("default", &[]);
        assert!(!should_inject(&meta, &InjectorConfig::default()));
    }

    #[test]
    fn test_annotation_key_is_case_sensitive() {
        let meta = make_meta(
            "default",
            &[("Agent-Injector.contrib.mackerel.io/inject", "true")],
        );
        assert!(!should_inject(&meta, &InjectorConfig::default()));
    }

    #[test]
    fn test_ignored_namespace_wins_over_annotation() {
        let config = InjectorConfig::default();
        for namespace in ["kube-system", "kube-public"] {
            let meta = make_meta(namespace, &[(annotations::INJECT, "true")]);
            assert!(!should_inject(&meta, &config));
        }
    }

    #[test]
    fn test_ignored_namespace_match_is_exact() {
        let meta = make_meta("KUBE-SYSTEM", &[(annotations::INJECT, "true")]);
        assert!(should_inject(&meta, &InjectorConfig::default()));
    }

    #[test]
    fn test_custom_ignored_namespaces() {
        let config = InjectorConfig {
            ignored_namespaces: vec!["monitoring".to_string()],
            ..Default::default()
        };

        let meta = make_meta("monitoring", &[(annotations::INJECT, "true")]);
        assert!(!should_inject(&meta, &config));

        let meta = make_meta("kube-system", &[(annotations::INJECT, "true")]);
        assert!(should_inject(&meta, &config));
    }

    #[test]
    fn test_already_injected_any_case() {
        for status in ["injected", "Injected", "INJECTED"] {
            let meta = make_meta(
                "default",
                &[(annotations::INJECT, "true"), (annotations::STATUS, status)],
            );
            assert!(!should_inject(&meta, &InjectorConfig::default()));
            assert!(is_injected(&meta));
        }
    }

    #[test]
    fn test_unknown_status_does_not_block() {
        let meta = make_meta(
            "default",
            &[(annotations::INJECT, "true"), (annotations::STATUS, "pending")],
        );
        assert!(should_inject(&meta, &InjectorConfig::default()));
    }

    #[test]
    fn test_missing_namespace_is_not_ignored() {
        let meta = ObjectMeta {
            annotations: Some(BTreeMap::from([(
                annotations::INJECT.to_string(),
                "true".to_string(),
            )])),
            ..Default::default()
        };
        assert!(should_inject(&meta, &InjectorConfig::default()));
    }
}
