use core::str::FromStr;

use serde::{Deserialize, Serialize};

use gridcat_core::{DomainError, DomainResult, Entity, ResourceId};

use crate::characteristic::Characteristic;
use crate::location::Location;

/// Kind of catalog resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    ConnectionPoint,
    MeteringPoint,
}

impl ResourceType {
    pub const ALL: [ResourceType; 2] = [ResourceType::ConnectionPoint, ResourceType::MeteringPoint];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::ConnectionPoint => "CONNECTION_POINT",
            ResourceType::MeteringPoint => "METERING_POINT",
        }
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown resource type '{s}'")))
    }
}

/// Aggregate root: a catalog resource with its location and characteristics.
///
/// `id` is `None` until the store persists the resource for the first time.
/// `resource_type` is not optional, so a resource can never be persisted
/// without one. Characteristic order is the caller's insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    id: Option<ResourceId>,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,
}

impl Resource {
    /// A new, not-yet-persisted resource.
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            id: None,
            resource_type,
            country_code: None,
            location: None,
            characteristics: Vec::new(),
        }
    }

    /// Address an existing resource (full-replace updates).
    pub fn with_id(mut self, id: ResourceId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_characteristic(mut self, characteristic: Characteristic) -> Self {
        self.characteristics.push(characteristic);
        self
    }

    /// The same content, detached from any stored row.
    pub fn detached(mut self) -> Self {
        self.id = None;
        self
    }

    /// Check every rule and report all violations at once.
    pub fn validate(&self) -> DomainResult<()> {
        let violations: Vec<String> = self
            .characteristics
            .iter()
            .flat_map(Characteristic::violations)
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::violations(violations))
        }
    }
}

impl Entity for Resource {
    type Id = ResourceId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        debug_assert!(
            self.id.is_none() || self.id == Some(id),
            "resource id is immutable once assigned"
        );
        self.id = Some(id);
    }
}
