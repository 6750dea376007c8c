// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for building pods and admission reviews.

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Build a single-container pod with the given annotations
pub fn make_pod(name: &str, namespace: &str, annotations: &[(&str, &str)]) -> Pod {
    let annotations = (!annotations.is_empty()).then(|| {
        annotations
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>()
    });

    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations,
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "app".to_string(),
                image: Some("nginx:latest".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Wrap an object into an AdmissionReview request for the given kind
pub fn admission_review_json(
    group: &str,
    version: &str,
    kind: &str,
    resource: &str,
    operation: &str,
    object: Option<serde_json::Value>,
) -> String {
    serde_json::json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
            "kind": { "group": group, "version": version, "kind": kind },
            "resource": { "group": group, "version": version, "resource": resource },
            "name": "app",
            "namespace": "default",
            "operation": operation,
            "userInfo": { "username": "admin", "groups": ["system:authenticated"] },
            "object": object,
            "oldObject": null,
            "dryRun": false,
            "options": null
        }
    })
    .to_string()
}

/// AdmissionReview for creating the given pod
pub fn pod_review_json(pod: &Pod) -> String {
    let object = serde_json::to_value(pod).expect("pod serializes");
    admission_review_json("", "v1", "Pod", "pods", "CREATE", Some(object))
}
