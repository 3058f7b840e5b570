//! # Supplier Repository
//!
//! Database operations for suppliers. Emails are unique across suppliers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::unit_of_work::WriteGate;
use rxstock_core::{NewSupplier, Supplier};

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
    gate: WriteGate,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool, gate: WriteGate) -> Self {
        SupplierRepository { pool, gate }
    }

    /// Creates a supplier.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` if the email is already registered
    pub async fn create(&self, new: &NewSupplier) -> DbResult<Supplier> {
        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            contact_person: trimmed(new.contact_person.as_deref()),
            email: new.email.trim().to_string(),
            phone: new.phone.trim().to_string(),
            address: trimmed(new.address.as_deref()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %supplier.id, email = %supplier.email, "Inserting supplier");

        let _writer = self.gate.acquire().await;
        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_person, email, phone, address,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.is_active)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &supplier.email),
            other => other,
        })?;

        Ok(supplier)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, email, phone, address,
                   is_active, created_at, updated_at
            FROM suppliers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists suppliers ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, email, phone, address,
                   is_active, created_at, updated_at
            FROM suppliers
            ORDER BY name, id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_supplier, test_db};

    #[tokio::test]
    async fn test_create_and_list() {
        let db = test_db().await;
        let repo = db.suppliers();

        let b = repo.create(&new_supplier("b@example.com")).await.unwrap();
        let mut a_req = new_supplier("a@example.com");
        a_req.name = "Acme Pharma".to_string();
        a_req.contact_person = Some("  ".to_string());
        let a = repo.create(&a_req).await.unwrap();

        assert_eq!(a.contact_person, None);
        let fetched = repo.get_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "b@example.com");
        assert!(fetched.is_active);

        let listed = repo.list(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Acme Pharma");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let repo = db.suppliers();
        repo.create(&new_supplier("dup@example.com")).await.unwrap();

        let err = repo.create(&new_supplier("dup@example.com")).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "suppliers.email");
                assert_eq!(value, "dup@example.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }
}
