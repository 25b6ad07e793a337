use std::collections::BTreeMap;
use std::sync::RwLock;

use gridcat_core::{CharacteristicId, Entity, LocationId, ResourceId};
use gridcat_resources::{Characteristic, Location, Resource, ResourceType};

use super::r#trait::{ResourceStore, StoreError};

#[derive(Debug, Clone)]
struct ResourceRow {
    resource_type: ResourceType,
    country_code: Option<String>,
    location_id: Option<LocationId>,
    characteristic_ids: Vec<CharacteristicId>,
}

#[derive(Debug, Default)]
struct Tables {
    locations: BTreeMap<LocationId, Location>,
    characteristics: BTreeMap<CharacteristicId, Characteristic>,
    resources: BTreeMap<ResourceId, ResourceRow>,
    last_location: i64,
    last_characteristic: i64,
    last_resource: i64,
}

impl Tables {
    fn upsert_location(&mut self, mut location: Location) -> LocationId {
        let id = match location.id.filter(|id| self.locations.contains_key(id)) {
            Some(id) => id,
            None => {
                self.last_location += 1;
                LocationId::new(self.last_location)
            }
        };
        location.id = Some(id);
        self.locations.insert(id, location);
        id
    }

    fn upsert_characteristic(&mut self, mut characteristic: Characteristic) -> CharacteristicId {
        let id = match characteristic.id.filter(|id| self.characteristics.contains_key(id)) {
            Some(id) => id,
            None => {
                self.last_characteristic += 1;
                CharacteristicId::new(self.last_characteristic)
            }
        };
        characteristic.id = Some(id);
        self.characteristics.insert(id, characteristic);
        id
    }

    fn resolve(&self, id: ResourceId, row: &ResourceRow) -> Result<Resource, StoreError> {
        let mut resource = Resource::new(row.resource_type).with_id(id);
        resource.country_code = row.country_code.clone();

        if let Some(location_id) = row.location_id {
            let location = self.locations.get(&location_id).ok_or_else(|| {
                StoreError::Corrupt(format!("resource {id} references missing location {location_id}"))
            })?;
            resource.location = Some(location.clone());
        }

        for characteristic_id in &row.characteristic_ids {
            let characteristic = self.characteristics.get(characteristic_id).ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "resource {id} references missing characteristic {characteristic_id}"
                ))
            })?;
            resource.characteristics.push(characteristic.clone());
        }

        Ok(resource)
    }
}

/// In-memory resource store.
///
/// Intended for tests/dev. A single lock covers all tables, so every `save`
/// is atomic with respect to concurrent readers.
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    tables: RwLock<Tables>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources.
    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.resources.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored location rows (kept after their resource is deleted).
    pub fn location_count(&self) -> usize {
        self.tables.read().map(|t| t.locations.len()).unwrap_or(0)
    }

    /// Number of stored characteristic rows.
    pub fn characteristic_count(&self) -> usize {
        self.tables.read().map(|t| t.characteristics.len()).unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn find_by_id(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;

        tables
            .resources
            .get(&id)
            .map(|row| tables.resolve(id, row))
            .transpose()
    }

    async fn save(&self, resource: Resource) -> Result<Resource, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;

        // Reject before touching any table so a failed replace leaves no trace.
        if let Some(id) = resource.id() {
            if !tables.resources.contains_key(&id) {
                return Err(StoreError::Missing(id));
            }
        }

        let id = resource.id();
        let Resource {
            resource_type,
            country_code,
            location,
            characteristics,
            ..
        } = resource;

        let location_id = location.map(|l| tables.upsert_location(l));
        let characteristic_ids = characteristics
            .into_iter()
            .map(|c| tables.upsert_characteristic(c))
            .collect();

        let id = match id {
            Some(id) => id,
            None => {
                tables.last_resource += 1;
                ResourceId::new(tables.last_resource)
            }
        };

        let row = ResourceRow {
            resource_type,
            country_code,
            location_id,
            characteristic_ids,
        };
        let snapshot = tables.resolve(id, &row)?;
        tables.resources.insert(id, row);

        Ok(snapshot)
    }

    async fn delete_by_id(&self, id: ResourceId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.resources.remove(&id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Resource>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;

        tables
            .resources
            .iter()
            .map(|(id, row)| tables.resolve(*id, row))
            .collect()
    }
}
