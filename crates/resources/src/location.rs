use serde::{Deserialize, Serialize};

use gridcat_core::{Entity, LocationId};

/// Physical address of a resource.
///
/// Owned by a resource, but stored as its own row so several resources can
/// point at the same place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub id: Option<LocationId>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<i32>,
    pub country_code: Option<String>,
}

impl Location {
    pub fn new(
        street_address: impl Into<String>,
        city: impl Into<String>,
        postal_code: i32,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            street_address: Some(street_address.into()),
            city: Some(city.into()),
            postal_code: Some(postal_code),
            country_code: Some(country_code.into()),
        }
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}
