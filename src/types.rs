use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Request to start one bypass helper for a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BypassSpec {
    pub id: String,
    /// Control socket the helper listens on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<PathBuf>,
    #[serde(default)]
    pub port_mapping: Vec<PortMapping>,
    /// Destination subnets the helper must leave alone
    #[serde(default)]
    pub ignore_subnets: Vec<String>,
    /// Do not intercept bind(2) for inbound sockets
    #[serde(default)]
    pub ignore_bind: bool,
}

impl BypassSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            socket_path: None,
            pid_file_path: None,
            log_file_path: None,
            port_mapping: Vec::new(),
            ignore_subnets: Vec::new(),
            ignore_bind: false,
        }
    }
}

/// Published port: `parent_port` on the host side, `child_port` inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub parent_port: u16,
    pub child_port: u16,
}

impl PortMapping {
    pub fn new(parent_port: u16, child_port: u16) -> Self {
        Self {
            parent_port,
            child_port,
        }
    }
}

impl std::fmt::Display for PortMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.parent_port, self.child_port)
    }
}

/// A running bypass session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BypassStatus {
    pub id: String,
    pub pid: u32,
    pub spec: BypassSpec,
}

/// Interface report for one container, posted by the helper.
///
/// Fields are kept as raw JSON and absent ones stay absent, so a report is
/// handed back exactly as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInterfaces {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub interfaces: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContainerInterfaces {
    pub fn new(container_id: impl Into<String>, interfaces: serde_json::Value) -> Self {
        Self {
            container_id: Some(container_id.into()),
            interfaces: Some(interfaces),
            extra: serde_json::Map::new(),
        }
    }
}

/// An explicit `null` is still a value that has to be echoed back.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Shorten a container ID for log output.
pub fn truncate_id(id: &str, max_len: usize) -> &str {
    match id.char_indices().nth(max_len) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
