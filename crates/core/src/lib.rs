//! FluxRadar core types: resource records, status vocabulary and cluster snapshots.

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod columns;

/// Errors raised while shaping inbound cluster snapshots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("request body is not valid JSON: {0}")]
    Json(String),
    #[error("Invalid ClusterData format. Expecting {{ clusterName: string, resources: Resource[] }}: {0}")]
    Shape(&'static str),
}

// ---- status vocabulary ----

/// Fixed display vocabulary for resource status.
///
/// Healthy has synonyms (`Available`, `Active`, `Running`) and so does error
/// (`Failed`); they stay distinct members so aggregates keep the producer's wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Ready,
    Available,
    Active,
    Running,
    Reconciling,
    Error,
    Failed,
    Suspended,
    Unknown,
}

impl Status {
    /// Display order used for overview breakdowns and filter choices.
    pub const ALL: [Status; 9] = [
        Status::Ready,
        Status::Available,
        Status::Active,
        Status::Running,
        Status::Reconciling,
        Status::Error,
        Status::Failed,
        Status::Suspended,
        Status::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ready => "Ready",
            Status::Available => "Available",
            Status::Active => "Active",
            Status::Running => "Running",
            Status::Reconciling => "Reconciling",
            Status::Error => "Error",
            Status::Failed => "Failed",
            Status::Suspended => "Suspended",
            Status::Unknown => "Unknown",
        }
    }

    /// Exact (case-sensitive) match against the vocabulary.
    pub fn parse(raw: &str) -> Option<Status> {
        Status::ALL.iter().copied().find(|s| s.as_str() == raw)
    }

    /// Map any raw status string into the vocabulary; anything unrecognized is `Unknown`.
    pub fn normalize(raw: &str) -> Status { Status::parse(raw).unwrap_or(Status::Unknown) }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ---- kinds ----

/// Kind of observed object. Producers may report kinds beyond the well-known set;
/// those are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    GitRepository,
    Kustomization,
    HelmRelease,
    Deployment,
    Service,
    Pod,
    Other(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::GitRepository => "GitRepository",
            ResourceKind::Kustomization => "Kustomization",
            ResourceKind::HelmRelease => "HelmRelease",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Service => "Service",
            ResourceKind::Pod => "Pod",
            ResourceKind::Other(s) => s,
        }
    }
}

/// Which subsystem produced the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// GitOps toolkit objects.
    #[serde(rename = "flux")]
    Flux,
    /// Orchestrator-native objects.
    #[serde(rename = "k8s")]
    K8s,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Flux => "flux",
            ResourceType::K8s => "k8s",
        }
    }
}

// ---- resource record ----

/// Named fields of a resource record, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Cluster,
    Kind,
    ResourceType,
    Name,
    Namespace,
    Status,
    Message,
    LastTransitionTime,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Id,
        Field::Cluster,
        Field::Kind,
        Field::ResourceType,
        Field::Name,
        Field::Namespace,
        Field::Status,
        Field::Message,
        Field::LastTransitionTime,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Cluster => "cluster",
            Field::Kind => "kind",
            Field::ResourceType => "resourceType",
            Field::Name => "name",
            Field::Namespace => "namespace",
            Field::Status => "status",
            Field::Message => "message",
            Field::LastTransitionTime => "lastTransitionTime",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }
}

/// One observed object inside a cluster.
///
/// Records arrive from untrusted producers and are not schema-validated, so the
/// record keeps the raw JSON object it was built from and exposes typed accessors
/// over it. Missing or mistyped fields read as empty strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource {
    raw: Map<String, Value>,
}

impl Resource {
    /// Build a well-formed record. `cluster` starts empty; the registry stamps it.
    pub fn new(
        id: impl Into<String>,
        kind: &ResourceKind,
        resource_type: ResourceType,
        name: impl Into<String>,
        namespace: impl Into<String>,
        status: &str,
    ) -> Self {
        let mut raw = Map::new();
        raw.insert("id".into(), Value::String(id.into()));
        raw.insert("cluster".into(), Value::String(String::new()));
        raw.insert("kind".into(), Value::String(kind.as_str().to_string()));
        raw.insert("resourceType".into(), Value::String(resource_type.as_str().to_string()));
        raw.insert("name".into(), Value::String(name.into()));
        raw.insert("namespace".into(), Value::String(namespace.into()));
        raw.insert("status".into(), Value::String(status.to_string()));
        raw.insert("message".into(), Value::String(String::new()));
        raw.insert("lastTransitionTime".into(), Value::String(String::new()));
        Self { raw }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.raw.insert("message".into(), Value::String(message.into()));
        self
    }

    pub fn with_last_transition(mut self, ts: impl Into<String>) -> Self {
        self.raw.insert("lastTransitionTime".into(), Value::String(ts.into()));
        self
    }

    pub fn with_cluster(mut self, cluster: &str) -> Self {
        self.stamp_cluster(cluster);
        self
    }

    /// Wrap an arbitrary JSON value. Non-object values carry no fields and become an
    /// empty record.
    pub fn from_value(v: Value) -> Self {
        match v {
            Value::Object(raw) => Self { raw },
            _ => Self::default(),
        }
    }

    pub fn raw(&self) -> &Map<String, Value> { &self.raw }

    /// Overwrite the owning cluster. The payload's own value is never trusted.
    pub fn stamp_cluster(&mut self, cluster: &str) {
        self.raw.insert("cluster".into(), Value::String(cluster.to_string()));
    }

    fn str_field(&self, key: &str) -> &str {
        self.raw.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn id(&self) -> &str { self.str_field("id") }
    pub fn cluster(&self) -> &str { self.str_field("cluster") }
    pub fn name(&self) -> &str { self.str_field("name") }
    pub fn namespace(&self) -> &str { self.str_field("namespace") }
    pub fn message(&self) -> &str { self.str_field("message") }
    pub fn last_transition_time(&self) -> &str { self.str_field("lastTransitionTime") }

    /// Status exactly as the producer reported it.
    pub fn raw_status(&self) -> &str { self.str_field("status") }

    /// Status mapped into the display vocabulary.
    pub fn status(&self) -> Status { Status::normalize(self.raw_status()) }

    /// Parsed `lastTransitionTime`, if present and RFC 3339.
    pub fn last_transition(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        let s = self.last_transition_time();
        if s.is_empty() {
            return None;
        }
        chrono::DateTime::parse_from_rfc3339(s).ok()
    }

    /// Stringified field value: strings verbatim, missing/null as empty, other
    /// JSON values in their compact JSON form.
    pub fn field_text(&self, field: Field) -> Cow<'_, str> {
        match self.raw.get(field.key()) {
            None | Some(Value::Null) => Cow::Borrowed(""),
            Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}

// ---- snapshots ----

/// The unit of ingestion: one cluster's full resource set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    pub cluster_name: String,
    pub resources: Vec<Resource>,
}

impl ClusterSnapshot {
    pub fn new(cluster_name: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self { cluster_name: cluster_name.into(), resources }
    }

    /// Parse and validate a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        let v: Value = serde_json::from_slice(body).map_err(|e| PayloadError::Json(e.to_string()))?;
        Self::from_value(v)
    }

    /// Validate the top-level shape only; nested records are accepted as they are.
    pub fn from_value(v: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut obj) = v else {
            return Err(PayloadError::Shape("body must be a JSON object"));
        };
        let cluster_name = match obj.remove("clusterName") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::String(_)) => return Err(PayloadError::Shape("clusterName must not be empty")),
            Some(_) => return Err(PayloadError::Shape("clusterName must be a string")),
            None => return Err(PayloadError::Shape("clusterName is required")),
        };
        let resources = match obj.remove("resources") {
            Some(Value::Array(items)) => items.into_iter().map(Resource::from_value).collect(),
            Some(_) => return Err(PayloadError::Shape("resources must be an array")),
            None => return Err(PayloadError::Shape("resources is required")),
        };
        Ok(Self { cluster_name, resources })
    }
}

/// Registry contents at one instant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistrySnapshot {
    /// Number of accepted mutations since the registry was created.
    pub epoch: u64,
    pub items: Vec<Resource>,
}

pub mod prelude {
    pub use super::{ClusterSnapshot, Field, PayloadError, RegistrySnapshot, Resource, ResourceKind, ResourceType, Status};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_normalizes_without_touching_raw() {
        let r = Resource::from_value(json!({"name": "a", "status": "Bogus"}));
        assert_eq!(r.status(), Status::Unknown);
        assert_eq!(r.raw_status(), "Bogus");
        assert_eq!(Status::normalize("Running"), Status::Running);
        assert_eq!(Status::normalize("running"), Status::Unknown);
    }

    #[test]
    fn snapshot_validation_rejects_bad_shapes() {
        assert!(matches!(ClusterSnapshot::from_slice(b"not json"), Err(PayloadError::Json(_))));
        assert!(matches!(ClusterSnapshot::from_value(json!([])), Err(PayloadError::Shape(_))));
        assert!(matches!(ClusterSnapshot::from_value(json!({"resources": []})), Err(PayloadError::Shape(_))));
        assert!(matches!(ClusterSnapshot::from_value(json!({"clusterName": 3, "resources": []})), Err(PayloadError::Shape(_))));
        assert!(matches!(ClusterSnapshot::from_value(json!({"clusterName": "a", "resources": {}})), Err(PayloadError::Shape(_))));
        assert!(matches!(ClusterSnapshot::from_value(json!({"clusterName": "a"})), Err(PayloadError::Shape(_))));
    }

    #[test]
    fn snapshot_keeps_malformed_records() {
        let snap = ClusterSnapshot::from_value(json!({
            "clusterName": "prod",
            "resources": [{"name": 7, "extra": true}, "garbage"],
        }))
        .unwrap();
        assert_eq!(snap.cluster_name, "prod");
        assert_eq!(snap.resources.len(), 2);
        assert_eq!(snap.resources[0].name(), "");
        assert_eq!(snap.resources[0].field_text(Field::Name), "7");
        assert_eq!(snap.resources[0].raw().get("extra"), Some(&json!(true)));
        assert!(snap.resources[1].raw().is_empty());
    }

    #[test]
    fn resource_round_trips_wire_shape() {
        let r = Resource::new("ns-pod-a", &ResourceKind::Pod, ResourceType::K8s, "a", "ns", "Running")
            .with_cluster("dev")
            .with_last_transition("2024-05-01T10:00:00Z");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["resourceType"], "k8s");
        assert_eq!(v["cluster"], "dev");
        let back: Resource = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
        assert!(back.last_transition().is_some());
    }
}
