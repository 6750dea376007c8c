// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Agent sidecar injection: eligibility check, sidecar builder and pod patcher.
//!
//! Everything in here is synchronous and free of I/O. The webhook layer
//! decodes the pod, hands it to [`Injector::mutate`] and encodes the result.

pub mod eligibility;
pub mod patch;
pub mod sidecar;

pub use eligibility::should_inject;
pub use sidecar::{build_container, Sidecar};

use crate::config::InjectorConfig;
use crate::error::Result;
use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Mutates pods with the agent sidecar using a shared, read-only configuration
#[derive(Debug, Clone)]
pub struct Injector {
    config: Arc<InjectorConfig>,
}

impl Injector {
    pub fn new(config: InjectorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    pub fn should_inject(&self, meta: &ObjectMeta) -> bool {
        should_inject(meta, &self.config)
    }

    pub fn build_container(
        &self,
        pod_annotations: &BTreeMap<String, String>,
        existing_containers: &[Container],
    ) -> Result<Sidecar> {
        build_container(pod_annotations, existing_containers, &self.config)
    }

    /// Inject the sidecar into the pod if it asks for one.
    ///
    /// Returns `Ok(true)` when the pod was mutated and `Ok(false)` when it was
    /// not eligible. On error the pod is left untouched.
    #[instrument(
        skip(self, pod),
        fields(pod = %pod.name_any(), namespace = %pod.namespace().unwrap_or_default())
    )]
    pub fn mutate(&self, pod: &mut Pod) -> Result<bool> {
        let required = self.should_inject(&pod.metadata);
        debug!(required, "Checked mutation requirement");
        if !required {
            return Ok(false);
        }

        let containers = pod
            .spec
            .as_ref()
            .map(|s| s.containers.as_slice())
            .unwrap_or_default();
        let sidecar = self.build_container(pod.annotations(), containers)?;

        patch::apply(pod, sidecar);
        info!("Injected agent sidecar");

        Ok(true)
    }
}
