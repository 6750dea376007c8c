// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::constants::{sidecar, webhook, DEFAULT_IGNORED_NAMESPACES};

/// Injector settings loaded from environment variables.
///
/// Built once at startup and shared read-only by every admission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectorConfig {
    /// Fallback API key used when a pod does not reference a secret
    pub agent_api_key: String,
    pub kubelet_port: Option<u16>,
    pub kubelet_read_only_port: Option<u16>,
    pub kubelet_insecure_tls: bool,
    /// Namespaces that are never mutated, matched exactly
    pub ignored_namespaces: Vec<String>,
    pub sidecar_image: String,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            agent_api_key: String::new(),
            kubelet_port: None,
            kubelet_read_only_port: None,
            kubelet_insecure_tls: false,
            ignored_namespaces: DEFAULT_IGNORED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            sidecar_image: sidecar::DEFAULT_IMAGE.to_string(),
        }
    }
}

impl InjectorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ignored_namespaces = match lookup("IGNORED_NAMESPACES") {
            Some(value) => split_list(&value),
            None => defaults.ignored_namespaces,
        };

        Ok(Self {
            agent_api_key: lookup("AGENT_API_KEY").unwrap_or_default(),
            kubelet_port: parse_port(lookup("AGENT_KUBELET_PORT"))
                .context("AGENT_KUBELET_PORT is not a valid port")?,
            kubelet_read_only_port: parse_port(lookup("AGENT_KUBELET_READ_ONLY_PORT"))
                .context("AGENT_KUBELET_READ_ONLY_PORT is not a valid port")?,
            kubelet_insecure_tls: parse_bool(lookup("AGENT_KUBELET_INSECURE_TLS"))
                .context("AGENT_KUBELET_INSECURE_TLS is not a valid boolean")?,
            ignored_namespaces,
            sidecar_image: lookup("AGENT_IMAGE")
                .filter(|image| !image.trim().is_empty())
                .unwrap_or(defaults.sidecar_image),
        })
    }

    pub fn is_ignored_namespace(&self, namespace: &str) -> bool {
        self.ignored_namespaces.iter().any(|ns| ns == namespace)
    }
}

/// Listener settings for the admission webhook server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub tls_cert_file: PathBuf,
    pub tls_key_file: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("WEBHOOK_BIND_ADDRESS")
            .unwrap_or_else(|| webhook::DEFAULT_BIND_ADDRESS.to_string());
        let bind_address: SocketAddr = bind_address.parse().with_context(|| {
            format!("WEBHOOK_BIND_ADDRESS '{}' is not a socket address", bind_address)
        })?;

        Ok(Self {
            bind_address,
            tls_cert_file: lookup("WEBHOOK_TLS_CERT_FILE")
                .unwrap_or_else(|| webhook::DEFAULT_TLS_CERT_FILE.to_string())
                .into(),
            tls_key_file: lookup("WEBHOOK_TLS_KEY_FILE")
                .unwrap_or_else(|| webhook::DEFAULT_TLS_KEY_FILE.to_string())
                .into(),
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// "-1" is accepted as "unset" for compatibility with existing deployments.
fn parse_port(value: Option<String>) -> Result<Option<u16>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() || value == "-1" {
        return Ok(None);
    }
    value
        .parse::<u16>()
        .map(Some)
        .map_err(|e| anyhow!("'{}': {}", value, e))
}

fn parse_bool(value: Option<String>) -> Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        other => Err(anyhow!("'{}'", other)),
    }
}
