//! Business-rule layer between the HTTP surface and the store.

use async_trait::async_trait;
use entity::employees;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::store::EmployeeStore;

/// Stable contract presented to the HTTP layer. A trait so tests and other
/// surfaces can substitute implementations.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Persist a new employee, rejecting an already-taken email without
    /// writing.
    async fn create_employee(&self, employee: employees::Model)
        -> ServiceResult<employees::Model>;

    async fn list_employees(&self) -> ServiceResult<Vec<employees::Model>>;

    /// Absence is a normal outcome, not an error.
    async fn employee_by_id(&self, id: i64) -> ServiceResult<Option<employees::Model>>;

    /// Overwrite the row named by `employee.id`. No existence pre-check;
    /// an unknown id falls through to the store's upsert semantics.
    async fn update_employee(&self, employee: employees::Model)
        -> ServiceResult<employees::Model>;

    /// Idempotent; deleting an unknown id is accepted.
    async fn delete_employee(&self, id: i64) -> ServiceResult<()>;
}

/// The one real implementation, stateless over an injected store.
pub struct DirectoryService<S> {
    store: S,
}

impl<S> DirectoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: EmployeeStore> EmployeeDirectory for DirectoryService<S> {
    async fn create_employee(
        &self,
        employee: employees::Model,
    ) -> ServiceResult<employees::Model> {
        // Check-then-act; not atomic against concurrent creates. The unique
        // index on email is the backstop.
        if self.store.find_by_email(&employee.email).await?.is_some() {
            warn!(email = %employee.email, "rejected create for existing email");
            return Err(ServiceError::DuplicateEmail {
                email: employee.email,
            });
        }
        let created = self.store.save(employee).await?;
        debug!(id = created.id, "employee created");
        Ok(created)
    }

    async fn list_employees(&self) -> ServiceResult<Vec<employees::Model>> {
        Ok(self.store.find_all().await?)
    }

    async fn employee_by_id(&self, id: i64) -> ServiceResult<Option<employees::Model>> {
        Ok(self.store.find_by_id(id).await?)
    }

    async fn update_employee(
        &self,
        employee: employees::Model,
    ) -> ServiceResult<employees::Model> {
        Ok(self.store.save(employee).await?)
    }

    async fn delete_employee(&self, id: i64) -> ServiceResult<()> {
        self.store.delete_by_id(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicI64, AtomicUsize, Ordering},
    };

    use sea_orm::DbErr;

    use super::*;

    /// In-memory stand-in for the real store; counts writes so tests can
    /// assert the duplicate path never saves.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<employees::Model>>,
        next_id: AtomicI64,
        saves: AtomicUsize,
    }

    impl MemoryStore {
        fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmployeeStore for MemoryStore {
        async fn save(&self, mut employee: employees::Model) -> Result<employees::Model, DbErr> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            if employee.id == 0 {
                employee.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                rows.push(employee.clone());
            } else if let Some(row) = rows.iter_mut().find(|row| row.id == employee.id) {
                *row = employee.clone();
            } else {
                rows.push(employee.clone());
            }
            Ok(employee)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<employees::Model>, DbErr> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.id == id)
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<employees::Model>, DbErr> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.email == email)
                .cloned())
        }

        async fn find_all(&self) -> Result<Vec<employees::Model>, DbErr> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn delete_by_id(&self, id: i64) -> Result<(), DbErr> {
            self.rows.lock().unwrap().retain(|row| row.id != id);
            Ok(())
        }

        async fn find_by_name(
            &self,
            first_name: &str,
            last_name: &str,
        ) -> Result<employees::Model, DbErr> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.first_name == first_name && row.last_name == last_name)
                .cloned()
                .ok_or_else(|| DbErr::RecordNotFound("no match".into()))
        }

        async fn find_by_name_raw(
            &self,
            first_name: &str,
            last_name: &str,
        ) -> Result<employees::Model, DbErr> {
            self.find_by_name(first_name, last_name).await
        }
    }

    fn perico() -> employees::Model {
        employees::Model {
            id: 0,
            first_name: "Perico".into(),
            last_name: "Palotes".into(),
            email: "perico@mail.com".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_keeps_fields() {
        let service = DirectoryService::new(MemoryStore::default());
        let created = service.create_employee(perico()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.email, "perico@mail.com");
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email_without_writing() {
        let service = DirectoryService::new(MemoryStore::default());
        service.create_employee(perico()).await.unwrap();

        let mut second = perico();
        second.first_name = "Anselm".into();
        second.last_name = "Clave".into();
        let err = service.create_employee(second).await.unwrap_err();
        match err {
            ServiceError::DuplicateEmail { email } => assert_eq!(email, "perico@mail.com"),
            other => panic!("expected DuplicateEmail, got {other:?}"),
        }
        assert_eq!(service.store.save_count(), 1);
    }

    #[tokio::test]
    async fn list_reflects_store_size() {
        let service = DirectoryService::new(MemoryStore::default());
        service.create_employee(perico()).await.unwrap();
        let mut other = perico();
        other.email = "anselm@clave.com".into();
        let created = service.create_employee(other).await.unwrap();
        assert_eq!(service.list_employees().await.unwrap().len(), 2);

        service.delete_employee(created.id).await.unwrap();
        assert_eq!(service.list_employees().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookup_by_unknown_id_is_none() {
        let service = DirectoryService::new(MemoryStore::default());
        assert!(service.employee_by_id(999_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_is_idempotent() {
        let service = DirectoryService::new(MemoryStore::default());
        let created = service.create_employee(perico()).await.unwrap();
        let first = service.employee_by_id(created.id).await.unwrap();
        let second = service.employee_by_id(created.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_overwrites_without_duplicating() {
        let service = DirectoryService::new(MemoryStore::default());
        let mut created = service.create_employee(perico()).await.unwrap();
        created.last_name = "Palotes2".into();
        service.update_employee(created.clone()).await.unwrap();

        let fetched = service.employee_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.last_name, "Palotes2");
        assert_eq!(service.list_employees().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let service = DirectoryService::new(MemoryStore::default());
        let created = service.create_employee(perico()).await.unwrap();
        service.delete_employee(created.id).await.unwrap();
        service.delete_employee(created.id).await.unwrap();
        assert!(service.employee_by_id(created.id).await.unwrap().is_none());
    }
}
