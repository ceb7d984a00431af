//! Client Repository Implementation
//!
//! PostgreSQL implementation of the ClientRepository trait, covering the
//! client record, its package instances and the loyalty counters.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    Client, ClientRepository, InstanceService, PackageInstance, PackageInstanceStatus,
};
use crate::domain::value_objects::CalendarDate;
use crate::shared::error::AppError;

/// Database row representation matching the clients table schema.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    stamps_earned: i32,
    mimos_redeemed: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRow {
    fn into_client(self) -> Client {
        Client {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            stamps_earned: self.stamps_earned,
            mimos_redeemed: self.mimos_redeemed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row for client_packages.
#[derive(Debug, sqlx::FromRow)]
struct InstanceRow {
    id: Uuid,
    client_id: Uuid,
    package_name: String,
    status: String,
    purchase_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
}

impl InstanceRow {
    fn into_instance(self, services: Vec<InstanceService>) -> PackageInstance {
        PackageInstance {
            id: self.id,
            client_id: self.client_id,
            package_name: self.package_name,
            status: PackageInstanceStatus::from_str(&self.status),
            purchase_date: CalendarDate::new(self.purchase_date),
            expiry_date: self.expiry_date.map(CalendarDate::new),
            services,
        }
    }
}

/// Database row for client_package_items.
#[derive(Debug, sqlx::FromRow)]
struct InstanceServiceRow {
    client_package_id: Uuid,
    service_id: Uuid,
    remaining_quantity: i32,
}

const SELECT_CLIENT: &str = r#"
    SELECT id, name, email, phone, stamps_earned, mimos_redeemed, created_at, updated_at
    FROM clients
"#;

/// PostgreSQL client repository implementation.
#[derive(Clone)]
pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!("{} WHERE id = $1", SELECT_CLIENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ClientRow::into_client))
    }

    async fn find_by_normalized_name(
        &self,
        normalized: &str,
    ) -> Result<Option<Client>, AppError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "{} WHERE LOWER(TRIM(name)) = $1 LIMIT 1",
            SELECT_CLIENT
        ))
        .bind(normalized)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ClientRow::into_client))
    }

    async fn find_all(&self) -> Result<Vec<Client>, AppError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!("{} ORDER BY name", SELECT_CLIENT))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ClientRow::into_client).collect())
    }

    async fn create(&self, client: &Client) -> Result<Client, AppError> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clients (id, name, email, phone, stamps_earned, mimos_redeemed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, phone, stamps_earned, mimos_redeemed,
                      created_at, updated_at
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.stamps_earned)
        .bind(client.mimos_redeemed)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_client())
    }

    async fn update(&self, client: &Client) -> Result<Client, AppError> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET name = $2, email = $3, phone = $4, stamps_earned = $5,
                mimos_redeemed = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, stamps_earned, mimos_redeemed,
                      created_at, updated_at
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.stamps_earned)
        .bind(client.mimos_redeemed)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".into()))?;

        Ok(row.into_client())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client not found".into()));
        }
        Ok(())
    }

    async fn increment_stamps(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE clients SET stamps_earned = stamps_earned + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client not found".into()));
        }
        Ok(())
    }

    async fn increment_mimos_redeemed(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE clients SET mimos_redeemed = mimos_redeemed + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client not found".into()));
        }
        Ok(())
    }

    async fn find_package_instances(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<PackageInstance>, AppError> {
        let instance_rows = sqlx::query_as::<_, InstanceRow>(
            r#"
            SELECT id, client_id, package_name, status, purchase_date, expiry_date
            FROM client_packages
            WHERE client_id = $1
            ORDER BY purchase_date DESC, created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        if instance_rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = instance_rows.iter().map(|r| r.id).collect();
        let service_rows = sqlx::query_as::<_, InstanceServiceRow>(
            r#"
            SELECT client_package_id, service_id, remaining_quantity
            FROM client_package_items
            WHERE client_package_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(instance_rows
            .into_iter()
            .map(|row| {
                let services = service_rows
                    .iter()
                    .filter(|s| s.client_package_id == row.id)
                    .map(|s| InstanceService {
                        service_id: s.service_id,
                        remaining_quantity: s.remaining_quantity,
                    })
                    .collect();
                row.into_instance(services)
            })
            .collect())
    }

    async fn create_package_instance(
        &self,
        instance: &PackageInstance,
    ) -> Result<PackageInstance, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO client_packages
                (id, client_id, package_name, status, purchase_date, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(instance.id)
        .bind(instance.client_id)
        .bind(&instance.package_name)
        .bind(instance.status.as_str())
        .bind(instance.purchase_date.inner())
        .bind(instance.expiry_date.map(|d| d.inner()))
        .execute(&mut *tx)
        .await?;

        for service in &instance.services {
            sqlx::query(
                r#"
                INSERT INTO client_package_items
                    (client_package_id, service_id, remaining_quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(instance.id)
            .bind(service.service_id)
            .bind(service.remaining_quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(instance.clone())
    }

    async fn debit_instance_service(
        &self,
        instance_id: Uuid,
        service_id: Uuid,
    ) -> Result<bool, AppError> {
        // single keyed update; the WHERE clause makes it a no-op at zero
        let result = sqlx::query(
            r#"
            UPDATE client_package_items
            SET remaining_quantity = remaining_quantity - 1
            WHERE client_package_id = $1 AND service_id = $2 AND remaining_quantity > 0
            "#,
        )
        .bind(instance_id)
        .bind(service_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_instance_status(
        &self,
        instance_id: Uuid,
        status: PackageInstanceStatus,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE client_packages SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(instance_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Package instance not found".into()));
        }
        Ok(())
    }
}
