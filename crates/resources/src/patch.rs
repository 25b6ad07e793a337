//! Field-level merge for partial updates.

use serde::{Deserialize, Serialize};

use crate::characteristic::Characteristic;
use crate::location::Location;
use crate::resource::{Resource, ResourceType};

/// Fields to overwrite on an existing resource.
///
/// An absent (or JSON `null`) field leaves the stored value untouched. A
/// present `location` or `characteristics` replaces the stored one as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourcePatch {
    pub resource_type: Option<ResourceType>,
    pub country_code: Option<String>,
    pub location: Option<Location>,
    pub characteristics: Option<Vec<Characteristic>>,
}

impl ResourcePatch {
    pub fn is_empty(&self) -> bool {
        self.resource_type.is_none()
            && self.country_code.is_none()
            && self.location.is_none()
            && self.characteristics.is_none()
    }

    /// Merge the present fields into `resource`. The id is never touched.
    pub fn apply_to(self, resource: &mut Resource) {
        if let Some(resource_type) = self.resource_type {
            resource.resource_type = resource_type;
        }
        if let Some(country_code) = self.country_code {
            resource.country_code = Some(country_code);
        }
        if let Some(location) = self.location {
            resource.location = Some(location);
        }
        if let Some(characteristics) = self.characteristics {
            resource.characteristics = characteristics;
        }
    }
}
