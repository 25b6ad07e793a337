//! Behaviour every `ResourceStore` must show, written once over the trait.
//!
//! Each check only looks at rows it created itself, so the suite can run
//! against a shared database. `store_contract_tests!` expands the checks into
//! `#[tokio::test]`s for one store constructor.

use gridcat_core::{Entity, ResourceId};
use gridcat_resources::{Characteristic, CharacteristicType, Location, Resource, ResourceType};

use super::r#trait::{ResourceStore, StoreError};

fn metering_point() -> Resource {
    Resource::new(ResourceType::MeteringPoint)
        .with_country_code("EE")
        .with_location(Location::new("Rand tee 1", "Tallinn", 10001, "EE"))
        .with_characteristic(Characteristic::new("1", CharacteristicType::ConsumptionType, "220"))
        .with_characteristic(Characteristic::new("2", CharacteristicType::ChargingPoint, "Fast"))
}

pub(crate) async fn save_assigns_ids_to_the_whole_aggregate<S: ResourceStore>(store: &S) {
    let saved = store.save(metering_point()).await.unwrap();

    assert!(saved.id().is_some());
    assert!(saved.location.as_ref().and_then(|l| l.id).is_some());
    assert!(saved.characteristics.iter().all(|c| c.id.is_some()));
    assert_eq!(saved.location.as_ref().and_then(|l| l.city.as_deref()), Some("Tallinn"));
}

pub(crate) async fn find_by_id_returns_what_save_returned<S: ResourceStore>(store: &S) {
    let saved = store.save(metering_point()).await.unwrap();

    let found = store.find_by_id(saved.id().unwrap()).await.unwrap();

    assert_eq!(found, Some(saved));
}

pub(crate) async fn replace_keeps_the_id_and_clears_omitted_fields<S: ResourceStore>(store: &S) {
    let saved = store.save(metering_point()).await.unwrap();
    let id = saved.id().unwrap();

    let replaced = store
        .save(Resource::new(ResourceType::ConnectionPoint).with_id(id).with_country_code("FI"))
        .await
        .unwrap();

    assert_eq!(replaced.id(), Some(id));
    assert_eq!(replaced.resource_type, ResourceType::ConnectionPoint);
    assert_eq!(replaced.location, None);
    assert!(replaced.characteristics.is_empty());
    assert_eq!(store.find_by_id(id).await.unwrap(), Some(replaced));
}

pub(crate) async fn replacing_an_unknown_id_is_missing<S: ResourceStore>(store: &S) {
    let unknown = ResourceId::new(i64::MAX);

    let err = store.save(metering_point().with_id(unknown)).await.unwrap_err();

    assert!(matches!(err, StoreError::Missing(id) if id == unknown));
    assert_eq!(store.find_by_id(unknown).await.unwrap(), None);
    let all = store.find_all().await.unwrap();
    assert!(all.iter().all(|r| r.id() != Some(unknown)));
}

pub(crate) async fn characteristic_order_is_caller_order<S: ResourceStore>(store: &S) {
    let resource = ["c", "a", "b"].into_iter().fold(
        Resource::new(ResourceType::ConnectionPoint),
        |r, code| r.with_characteristic(Characteristic::new(code, CharacteristicType::ConsumptionType, "380")),
    );
    let saved = store.save(resource).await.unwrap();

    let found = store.find_by_id(saved.id().unwrap()).await.unwrap().unwrap();
    let codes: Vec<_> = found.characteristics.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["c", "a", "b"]);

    // Reordering on replace is kept as well.
    let mut reordered = found.clone();
    reordered.characteristics.reverse();
    let replaced = store.save(reordered).await.unwrap();
    let found = store.find_by_id(replaced.id().unwrap()).await.unwrap().unwrap();
    let codes: Vec<_> = found.characteristics.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["b", "a", "c"]);
}

pub(crate) async fn shared_rows_survive_deleting_one_owner<S: ResourceStore>(store: &S) {
    let first = store.save(metering_point()).await.unwrap();

    let mut second = Resource::new(ResourceType::ConnectionPoint);
    second.location = first.location.clone();
    second.characteristics = first.characteristics.clone();
    let second = store.save(second).await.unwrap();
    assert_eq!(second.location, first.location);
    assert_eq!(second.characteristics, first.characteristics);

    store.delete_by_id(first.id().unwrap()).await.unwrap();

    assert_eq!(store.find_by_id(first.id().unwrap()).await.unwrap(), None);
    let survivor = store.find_by_id(second.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(survivor.location, first.location);
    assert_eq!(survivor.characteristics, first.characteristics);
}

pub(crate) async fn delete_is_idempotent<S: ResourceStore>(store: &S) {
    let saved = store.save(metering_point()).await.unwrap();
    let id = saved.id().unwrap();

    store.delete_by_id(id).await.unwrap();
    store.delete_by_id(id).await.unwrap();
    store.delete_by_id(ResourceId::new(i64::MAX)).await.unwrap();

    assert_eq!(store.find_by_id(id).await.unwrap(), None);
}

pub(crate) async fn find_all_is_in_ascending_id_order<S: ResourceStore>(store: &S) {
    let mut saved = Vec::new();
    for _ in 0..3 {
        saved.push(store.save(metering_point()).await.unwrap());
    }
    let ours: Vec<_> = saved.iter().filter_map(|r| r.id()).collect();

    let all = store.find_all().await.unwrap();

    let ids: Vec<_> = all.iter().filter_map(|r| r.id()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    let found: Vec<_> = all.into_iter().filter(|r| r.id().is_some_and(|id| ours.contains(&id))).collect();
    assert_eq!(found, saved);
}

/// Expand the contract into tests for the store built by `$make().await`.
///
/// An optional `#[ignore = "..."]` is put on every generated test.
macro_rules! store_contract_tests {
    (@test $make:path [$(#[$attr:meta])?] $check:ident) => {
        #[tokio::test]
        $(#[$attr])?
        async fn $check() {
            let store = $make().await;
            $crate::store::contract::$check(&store).await;
        }
    };
    ($make:path $(, #[$attr:meta])?) => {
        mod contract {
            use super::*;

            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] save_assigns_ids_to_the_whole_aggregate);
            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] find_by_id_returns_what_save_returned);
            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] replace_keeps_the_id_and_clears_omitted_fields);
            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] replacing_an_unknown_id_is_missing);
            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] characteristic_order_is_caller_order);
            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] shared_rows_survive_deleting_one_owner);
            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] delete_is_idempotent);
            $crate::store::contract::store_contract_tests!(@test $make [$(#[$attr])?] find_all_is_in_ascending_id_order);
        }
    };
}

pub(crate) use store_contract_tests;
