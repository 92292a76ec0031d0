//! Persistence gateway over the `employees` table.

use async_trait::async_trait;
use entity::employees;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Statement,
};

/// Durable-storage contract for employee rows. Absence from the optional
/// finders is `Ok(None)`, never an error; the two name lookups fail with
/// `DbErr::RecordNotFound` when nothing matches.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Insert when `id == 0`, otherwise overwrite the matching row. A
    /// populated id with no matching row inserts a row with that id.
    async fn save(&self, employee: employees::Model) -> Result<employees::Model, DbErr>;

    async fn find_by_id(&self, id: i64) -> Result<Option<employees::Model>, DbErr>;

    async fn find_by_email(&self, email: &str) -> Result<Option<employees::Model>, DbErr>;

    async fn find_all(&self) -> Result<Vec<employees::Model>, DbErr>;

    /// Deleting a missing id is a no-op.
    async fn delete_by_id(&self, id: i64) -> Result<(), DbErr>;

    /// Exact match on both name fields via the query builder.
    async fn find_by_name(&self, first_name: &str, last_name: &str)
        -> Result<employees::Model, DbErr>;

    /// Same lookup issued as a raw parameterized statement.
    async fn find_by_name_raw(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<employees::Model, DbErr>;
}

/// sea-orm backed gateway.
#[derive(Clone)]
pub struct SeaOrmEmployeeStore {
    db: DatabaseConnection,
}

impl SeaOrmEmployeeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeStore for SeaOrmEmployeeStore {
    async fn save(&self, employee: employees::Model) -> Result<employees::Model, DbErr> {
        use sea_orm::ActiveModelTrait;

        if employee.id == 0 {
            let draft = employees::ActiveModel {
                id: NotSet,
                first_name: Set(employee.first_name),
                last_name: Set(employee.last_name),
                email: Set(employee.email),
            };
            return draft.insert(&self.db).await;
        }

        let exists = employees::Entity::find_by_id(employee.id)
            .one(&self.db)
            .await?
            .is_some();
        let record = employees::ActiveModel {
            id: Set(employee.id),
            first_name: Set(employee.first_name),
            last_name: Set(employee.last_name),
            email: Set(employee.email),
        };
        if exists {
            record.update(&self.db).await
        } else {
            // Upsert semantics: an unknown id creates the row instead of
            // failing.
            record.insert(&self.db).await
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<employees::Model>, DbErr> {
        employees::Entity::find_by_id(id).one(&self.db).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<employees::Model>, DbErr> {
        employees::Entity::find()
            .filter(employees::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    async fn find_all(&self) -> Result<Vec<employees::Model>, DbErr> {
        employees::Entity::find().all(&self.db).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DbErr> {
        employees::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<employees::Model, DbErr> {
        employees::Entity::find()
            .filter(employees::Column::FirstName.eq(first_name))
            .filter(employees::Column::LastName.eq(last_name))
            .one(&self.db)
            .await?
            .ok_or_else(|| record_not_found(first_name, last_name))
    }

    async fn find_by_name_raw(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<employees::Model, DbErr> {
        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => {
                "SELECT id, first_name, last_name, email FROM employees \
                 WHERE first_name = $1 AND last_name = $2"
            }
            _ => {
                "SELECT id, first_name, last_name, email FROM employees \
                 WHERE first_name = ? AND last_name = ?"
            }
        };
        employees::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                backend,
                sql,
                vec![first_name.into(), last_name.into()],
            ))
            .one(&self.db)
            .await?
            .ok_or_else(|| record_not_found(first_name, last_name))
    }
}

fn record_not_found(first_name: &str, last_name: &str) -> DbErr {
    DbErr::RecordNotFound(format!("no employee named {first_name} {last_name}"))
}
