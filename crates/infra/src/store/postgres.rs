//! Postgres-backed resource store.
//!
//! The aggregate is spread over four tables: `locations`, `characteristics`,
//! `resources` and the ordered link table `resources_characteristics`. Every
//! `save` runs in one transaction: nested rows are upserted first, then the
//! resource row, then its characteristic links are rewritten in caller order.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (any code) | `Backend` | Constraint violation, SQL error |
//! | PoolClosed | `Backend` | Connection pool was closed |
//! | RowNotFound | `Backend` | Unexpected (we use `fetch_optional`/`fetch_all`) |
//! | ColumnDecode / enum parse | `Corrupt` | Row no longer matches the domain model |
//! | Other | `Backend` | Network errors, connection failures, etc. |
//!
//! `StoreError::Missing` is produced explicitly when a replace touches no row.

use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use gridcat_core::{CharacteristicId, Entity, LocationId, ResourceId};
use gridcat_resources::{Characteristic, CharacteristicType, Location, Resource, ResourceType};

use super::r#trait::{ResourceStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id BIGSERIAL PRIMARY KEY,
        street_address TEXT,
        city TEXT,
        postal_code INTEGER,
        country_code TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characteristics (
        id BIGSERIAL PRIMARY KEY,
        code VARCHAR(5) NOT NULL,
        characteristic_type TEXT,
        characteristic_value TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS resources (
        id BIGSERIAL PRIMARY KEY,
        resource_type TEXT NOT NULL,
        country_code TEXT,
        location_id BIGINT REFERENCES locations (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS resources_characteristics (
        resource_id BIGINT NOT NULL REFERENCES resources (id) ON DELETE CASCADE,
        characteristic_id BIGINT NOT NULL REFERENCES characteristics (id),
        position INTEGER NOT NULL,
        PRIMARY KEY (resource_id, position)
    )
    "#,
];

const SELECT_RESOURCE: &str = r#"
    SELECT
        r.id,
        r.resource_type,
        r.country_code,
        l.id AS location_id,
        l.street_address,
        l.city,
        l.postal_code,
        l.country_code AS location_country_code
    FROM resources r
    LEFT JOIN locations l ON l.id = r.location_id
"#;

const SELECT_LINKED_CHARACTERISTICS: &str = r#"
    SELECT
        rc.resource_id,
        c.id,
        c.code,
        c.characteristic_type,
        c.characteristic_value
    FROM resources_characteristics rc
    JOIN characteristics c ON c.id = rc.characteristic_id
"#;

/// Postgres-backed resource store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`. Clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresResourceStore {
    pool: Arc<PgPool>,
}

impl PostgresResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the catalog tables when they do not exist yet.
    ///
    /// Bootstrap only; schema evolution is out of scope for this store.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(resource_id = %id), err)]
    pub async fn load(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_RESOURCE} WHERE r.id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_resource", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut resource = resource_from_row(&row)?;

        let rows = sqlx::query(&format!(
            "{SELECT_LINKED_CHARACTERISTICS} WHERE rc.resource_id = $1 ORDER BY rc.position ASC"
        ))
        .bind(id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_characteristics", e))?;

        for row in &rows {
            resource.characteristics.push(characteristic_from_row(row)?);
        }

        Ok(Some(resource))
    }

    #[instrument(skip(self), err)]
    pub async fn load_all(&self) -> Result<Vec<Resource>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_RESOURCE} ORDER BY r.id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_all_resources", e))?;

        let mut resources = BTreeMap::new();
        for row in &rows {
            let resource = resource_from_row(row)?;
            if let Some(id) = resource.id() {
                resources.insert(id, resource);
            }
        }

        let rows = sqlx::query(&format!(
            "{SELECT_LINKED_CHARACTERISTICS} ORDER BY rc.resource_id ASC, rc.position ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_all_characteristics", e))?;

        for row in &rows {
            let resource_id = ResourceId::new(get(row, "resource_id")?);
            // Links of a resource deleted between the two reads are skipped.
            if let Some(resource) = resources.get_mut(&resource_id) {
                resource.characteristics.push(characteristic_from_row(row)?);
            }
        }

        Ok(resources.into_values().collect())
    }

    /// Insert or replace the aggregate in one transaction.
    #[instrument(
        skip(self, resource),
        fields(resource_id = ?resource.id(), characteristic_count = resource.characteristics.len()),
        err
    )]
    pub async fn persist(&self, mut resource: Resource) -> Result<Resource, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        if let Some(location) = resource.location.as_mut() {
            let id = upsert_location(&mut tx, location).await?;
            location.id = Some(id);
        }

        for characteristic in resource.characteristics.iter_mut() {
            let id = upsert_characteristic(&mut tx, characteristic).await?;
            characteristic.id = Some(id);
        }

        let location_id = resource.location.as_ref().and_then(|l| l.id).map(|id| id.get());

        let id = match resource.id() {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE resources
                    SET resource_type = $2, country_code = $3, location_id = $4
                    WHERE id = $1
                    "#,
                )
                .bind(id.get())
                .bind(resource.resource_type.as_str())
                .bind(resource.country_code.as_deref())
                .bind(location_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_resource", e))?;

                if result.rows_affected() == 0 {
                    tx.rollback()
                        .await
                        .map_err(|e| map_sqlx_error("rollback", e))?;
                    return Err(StoreError::Missing(id));
                }

                sqlx::query("DELETE FROM resources_characteristics WHERE resource_id = $1")
                    .bind(id.get())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("unlink_characteristics", e))?;

                id
            }
            None => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO resources (resource_type, country_code, location_id)
                    VALUES ($1, $2, $3)
                    RETURNING id
                    "#,
                )
                .bind(resource.resource_type.as_str())
                .bind(resource.country_code.as_deref())
                .bind(location_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_resource", e))?;

                ResourceId::new(get(&row, "id")?)
            }
        };

        for (position, characteristic) in resource.characteristics.iter().enumerate() {
            let characteristic_id = characteristic.id.map(|id| id.get());
            sqlx::query(
                r#"
                INSERT INTO resources_characteristics (resource_id, characteristic_id, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(id.get())
            .bind(characteristic_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("link_characteristic", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        resource.assign_id(id);
        Ok(resource)
    }

    #[instrument(skip(self), fields(resource_id = %id), err)]
    pub async fn remove(&self, id: ResourceId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_resource", e))?;
        Ok(())
    }
}

/// Update the location row it names, or insert a fresh one.
async fn upsert_location(
    tx: &mut Transaction<'_, Postgres>,
    location: &Location,
) -> Result<LocationId, StoreError> {
    if let Some(id) = location.id {
        let result = sqlx::query(
            r#"
            UPDATE locations
            SET street_address = $2, city = $3, postal_code = $4, country_code = $5
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(location.street_address.as_deref())
        .bind(location.city.as_deref())
        .bind(location.postal_code)
        .bind(location.country_code.as_deref())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_location", e))?;

        if result.rows_affected() > 0 {
            return Ok(id);
        }
    }

    let row = sqlx::query(
        r#"
        INSERT INTO locations (street_address, city, postal_code, country_code)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(location.street_address.as_deref())
    .bind(location.city.as_deref())
    .bind(location.postal_code)
    .bind(location.country_code.as_deref())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_location", e))?;

    Ok(LocationId::new(get(&row, "id")?))
}

/// Update the characteristic row it names, or insert a fresh one.
async fn upsert_characteristic(
    tx: &mut Transaction<'_, Postgres>,
    characteristic: &Characteristic,
) -> Result<CharacteristicId, StoreError> {
    let characteristic_type = characteristic.characteristic_type.map(|t| t.as_str());

    if let Some(id) = characteristic.id {
        let result = sqlx::query(
            r#"
            UPDATE characteristics
            SET code = $2, characteristic_type = $3, characteristic_value = $4
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(characteristic.code.as_str())
        .bind(characteristic_type)
        .bind(characteristic.characteristic_value.as_deref())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_characteristic", e))?;

        if result.rows_affected() > 0 {
            return Ok(id);
        }
    }

    let row = sqlx::query(
        r#"
        INSERT INTO characteristics (code, characteristic_type, characteristic_value)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(characteristic.code.as_str())
    .bind(characteristic_type)
    .bind(characteristic.characteristic_value.as_deref())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_characteristic", e))?;

    Ok(CharacteristicId::new(get(&row, "id")?))
}

// Row mapping

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Corrupt(format!("failed to read column {column}: {e}")))
}

fn resource_from_row(row: &PgRow) -> Result<Resource, StoreError> {
    let id = ResourceId::new(get(row, "id")?);
    let resource_type: String = get(row, "resource_type")?;
    let resource_type = resource_type
        .parse::<ResourceType>()
        .map_err(|e| StoreError::Corrupt(format!("resource {id}: {e}")))?;

    let mut resource = Resource::new(resource_type).with_id(id);
    resource.country_code = get(row, "country_code")?;

    let location_id: Option<i64> = get(row, "location_id")?;
    if let Some(location_id) = location_id {
        resource.location = Some(Location {
            id: Some(LocationId::new(location_id)),
            street_address: get(row, "street_address")?,
            city: get(row, "city")?,
            postal_code: get(row, "postal_code")?,
            country_code: get(row, "location_country_code")?,
        });
    }

    Ok(resource)
}

fn characteristic_from_row(row: &PgRow) -> Result<Characteristic, StoreError> {
    let id = CharacteristicId::new(get(row, "id")?);
    let characteristic_type: Option<String> = get(row, "characteristic_type")?;
    let characteristic_type = characteristic_type
        .map(|t| t.parse::<CharacteristicType>())
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("characteristic {id}: {e}")))?;

    Ok(Characteristic {
        id: Some(id),
        code: get(row, "code")?,
        characteristic_type,
        characteristic_value: get(row, "characteristic_value")?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {} ({}): {}",
            operation,
            db_err.code().as_deref().unwrap_or("unknown"),
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            StoreError::Backend(format!("unexpected row not found in {}", operation))
        }
        sqlx::Error::ColumnDecode { .. } => {
            StoreError::Corrupt(format!("undecodable column in {}: {}", operation, err))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[async_trait::async_trait]
impl ResourceStore for PostgresResourceStore {
    async fn find_by_id(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        self.load(id).await
    }

    async fn save(&self, resource: Resource) -> Result<Resource, StoreError> {
        self.persist(resource).await
    }

    async fn delete_by_id(&self, id: ResourceId) -> Result<(), StoreError> {
        self.remove(id).await
    }

    async fn find_all(&self) -> Result<Vec<Resource>, StoreError> {
        self.load_all().await
    }
}
