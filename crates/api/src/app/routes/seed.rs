use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use gridcat_resources::{Characteristic, CharacteristicType, Location, Resource, ResourceType};

use crate::app::errors;
use crate::app::services::AppServices;

/// Sample catalog used by `GET /inject`.
pub fn sample_resources() -> Vec<Resource> {
    vec![
        Resource::new(ResourceType::ConnectionPoint)
            .with_country_code("EE")
            .with_location(Location::new("Rand tee 1", "Tallinn", 10001, "EE"))
            .with_characteristic(Characteristic::new("1", CharacteristicType::ConsumptionType, "220"))
            .with_characteristic(Characteristic::new("2", CharacteristicType::ConsumptionType, "380")),
        Resource::new(ResourceType::MeteringPoint)
            .with_country_code("EE")
            .with_location(Location::new("Pine tee 2", "Tartu", 20002, "EE"))
            .with_characteristic(Characteristic::new("3", CharacteristicType::ChargingPoint, "2 socket"))
            .with_characteristic(Characteristic::new("4", CharacteristicType::ConsumptionType, "220")),
        Resource::new(ResourceType::ConnectionPoint)
            .with_country_code("FI")
            .with_location(Location::new("Silver tee 3", "Helsinki", 30003, "FI"))
            .with_characteristic(Characteristic::new(
                "5",
                CharacteristicType::ConnectionPointStatus,
                "Available",
            ))
            .with_characteristic(Characteristic::new("6", CharacteristicType::ConsumptionType, "380")),
    ]
}

/// Seed the catalog through the regular `add` path (one change event each).
pub async fn inject(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let mut added = 0usize;
    for resource in sample_resources() {
        if let Err(e) = services.resources().add(resource).await {
            return errors::service_error_to_response(e);
        }
        added += 1;
    }

    info!(added, "sample resources injected");
    StatusCode::OK.into_response()
}
