// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applies a built sidecar to a pod and marks the pod as injected.

use crate::constants::annotations;
use crate::injector::sidecar::Sidecar;
use k8s_openapi::api::core::v1::Pod;

/// Append the sidecar (and its volume) to the pod and set the status annotation.
///
/// Append-only: existing containers and volumes are never replaced.
pub fn apply(pod: &mut Pod, sidecar: Sidecar) {
    let spec = pod.spec.get_or_insert_with(Default::default);

    if let Some(volume) = sidecar.volume {
        spec.volumes.get_or_insert_with(Vec::new).push(volume);
    }
    spec.containers.push(sidecar.container);

    pod.metadata
        .annotations
        .get_or_insert_with(Default::default)
        .insert(
            annotations::STATUS.to_string(),
            annotations::STATUS_INJECTED.to_string(),
        );
}
