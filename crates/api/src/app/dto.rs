use serde::{Deserialize, Serialize};

use gridcat_core::ResourceId;
use gridcat_resources::{Characteristic, Location, Resource, ResourceType};

pub const RESOURCE_TYPE_REQUIRED: &str = "ResourceType cannot be null";

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /resources/add` and `PUT /resources/:id`.
///
/// `resourceType` is optional here so a missing value becomes a validation
/// message instead of a parser error, and `characteristics` so an explicit
/// `null` reads as an empty list. Any `id` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceRequest {
    pub resource_type: Option<ResourceType>,
    pub country_code: Option<String>,
    pub location: Option<Location>,
    pub characteristics: Option<Vec<Characteristic>>,
}

impl ResourceRequest {
    /// Convert into a domain resource, collecting every violation found.
    pub fn into_resource(self, id: Option<ResourceId>) -> Result<Resource, Vec<String>> {
        let characteristics = self.characteristics.unwrap_or_default();
        let mut violations: Vec<String> = Vec::new();
        if self.resource_type.is_none() {
            violations.push(RESOURCE_TYPE_REQUIRED.to_string());
        }
        violations.extend(characteristics.iter().flat_map(Characteristic::violations));

        let Some(resource_type) = self.resource_type else {
            return Err(violations);
        };
        if !violations.is_empty() {
            return Err(violations);
        }

        let mut resource = Resource::new(resource_type);
        if let Some(id) = id {
            resource = resource.with_id(id);
        }
        resource.country_code = self.country_code;
        resource.location = self.location;
        resource.characteristics = characteristics;
        Ok(resource)
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Success envelope: `{"data": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T> {
    pub data: Vec<T>,
}

impl<T> DataEnvelope<T> {
    pub fn single(item: T) -> Self {
        Self { data: vec![item] }
    }
}

#[cfg(test)]
mod tests {
    use gridcat_resources::CharacteristicType;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_type_and_bad_codes_are_reported_together() {
        let request: ResourceRequest = serde_json::from_value(json!({
            "countryCode": "EE",
            "characteristics": [{"code": "", "characteristicType": "CONSUMPTION_TYPE"}]
        }))
        .unwrap();

        let violations = request.into_resource(None).unwrap_err();
        assert_eq!(violations[0], RESOURCE_TYPE_REQUIRED);
        assert!(violations.contains(&"Code is required field.".to_string()));
    }

    #[test]
    fn path_id_wins_over_body() {
        let request: ResourceRequest = serde_json::from_value(json!({
            "id": 99,
            "resourceType": "METERING_POINT",
            "characteristics": [{"code": "1", "characteristicType": "CHARGING_POINT", "characteristicValue": "2 socket"}]
        }))
        .unwrap();

        let resource = request.into_resource(Some(ResourceId::new(4))).unwrap();
        assert_eq!(gridcat_core::Entity::id(&resource), Some(ResourceId::new(4)));
        assert_eq!(resource.resource_type, ResourceType::MeteringPoint);
        assert_eq!(
            resource.characteristics[0].characteristic_type,
            Some(CharacteristicType::ChargingPoint)
        );
    }

    #[test]
    fn null_characteristics_read_as_none() {
        let request: ResourceRequest = serde_json::from_value(json!({
            "resourceType": "CONNECTION_POINT",
            "characteristics": null
        }))
        .unwrap();

        let resource = request.into_resource(None).unwrap();
        assert!(resource.characteristics.is_empty());
    }

    #[test]
    fn null_code_is_a_validation_message() {
        let request: ResourceRequest = serde_json::from_value(json!({
            "resourceType": "CONNECTION_POINT",
            "characteristics": [{"code": null, "characteristicType": "CHARGING_POINT"}]
        }))
        .unwrap();

        let violations = request.into_resource(None).unwrap_err();
        assert_eq!(violations, vec!["Code is required field.".to_string()]);
    }

    #[test]
    fn envelope_wraps_a_single_item_in_a_list() {
        let body = serde_json::to_value(DataEnvelope::single(1)).unwrap();
        assert_eq!(body, json!({"data": [1]}));
    }
}
