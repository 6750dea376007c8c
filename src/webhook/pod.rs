// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod mutation webhook
//!
//! Decodes the pod from an AdmissionReview, runs the injector and answers
//! with a JSON patch. The webhook never rejects a pod: when anything goes
//! wrong the error is logged and the pod is admitted unchanged.

use std::sync::Arc;

use axum::{extract::State, Json};
use k8s_openapi::api::core::v1::Pod;
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
    DynamicObject,
};
use tracing::{debug, error, info, warn};

use crate::error::{InjectorError, Result};
use crate::injector::Injector;

use super::WebhookState;

/// Handle a mutating admission review for pods
pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    Json(mutate_pod(&state.injector, &req).into_review())
}

/// Run the injector for a single admission request
fn mutate_pod(injector: &Injector, request: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
    let uid = &request.uid;
    let allow = || AdmissionResponse::from(request);

    let Some(object) = &request.object else {
        debug!(
            uid = %uid,
            operation = ?request.operation,
            "No object in request, allowing unchanged"
        );
        return allow();
    };

    let original = match decode_pod(request, object) {
        Ok(pod) => pod,
        Err(e) => {
            warn!(uid = %uid, error = %e, "Skipping mutation");
            return allow();
        }
    };

    let mut pod = original.clone();
    match injector.mutate(&mut pod) {
        Ok(true) => {}
        Ok(false) => {
            debug!(uid = %uid, pod = ?request.name, "No mutation needed");
            return allow();
        }
        Err(e) => {
            error!(uid = %uid, pod = ?request.name, error = %e, "Failed to inject agent sidecar");
            return allow();
        }
    }

    let patch = match compute_patch(&original, &pod) {
        Ok(patch) => patch,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to compute patch");
            return allow();
        }
    };

    info!(
        uid = %uid,
        pod = ?request.name,
        namespace = ?request.namespace,
        patch_ops = patch.0.len(),
        "Patching pod with agent sidecar"
    );

    match allow().with_patch(patch) {
        Ok(response) => response,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to serialize patch");
            allow()
        }
    }
}

/// Decode the admitted object as a core v1 Pod
fn decode_pod(request: &AdmissionRequest<DynamicObject>, object: &DynamicObject) -> Result<Pod> {
    let gvk = &request.kind;
    if !(gvk.group.is_empty() && gvk.version == "v1" && gvk.kind == "Pod") {
        return Err(InjectorError::TypeMismatch(format!(
            "expected v1/Pod, got {}/{}/{}",
            gvk.group, gvk.version, gvk.kind
        )));
    }

    let value = serde_json::to_value(object)?;
    serde_json::from_value(value)
        .map_err(|e| InjectorError::TypeMismatch(format!("object is not a valid Pod: {}", e)))
}

/// JSON patch turning the original pod into the mutated one
fn compute_patch(original: &Pod, mutated: &Pod) -> Result<json_patch::Patch> {
    let before = serde_json::to_value(original)?;
    let after = serde_json::to_value(mutated)?;
    Ok(json_patch::diff(&before, &after))
}
