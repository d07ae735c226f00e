use crate::{
    error::ApiError,
    models::{CreateEmployeeRequest, Employee, EmployeePatch},
};
use parking_lot::Mutex;
use std::{str::FromStr, sync::Arc};

/// Repository Trait
///
/// Contract for the employee registry. Handlers only ever see `Arc<dyn Repository>`,
/// so the in-memory store can be swapped for a mock in tests.
///
/// Callers must have passed the session check before reaching any of these methods;
/// the registry itself knows nothing about authorization.
pub trait Repository: Send + Sync {
    /// All records in insertion order.
    fn list(&self) -> Vec<Employee>;
    fn get(&self, id: u64) -> Result<Employee, ApiError>;
    /// Assigns the next id, appends the record and returns it.
    fn create(&self, req: CreateEmployeeRequest) -> Employee;
    /// Partial update: only present, non-empty fields overwrite. The record keeps its
    /// position in the collection.
    fn update(&self, id: u64, patch: EmployeePatch) -> Result<Employee, ApiError>;
    fn remove(&self, id: u64) -> Result<(), ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share the registry across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// IdPolicy
///
/// How new employee ids are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Independent counter starting at 0. Ids are never reused, even after removals.
    #[default]
    Sequence,
    /// Last record's id + 1, or 0 when empty. Removing the last record frees its id
    /// for the next insert.
    FollowTail,
}

impl FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequence" => Ok(IdPolicy::Sequence),
            "tail" => Ok(IdPolicy::FollowTail),
            other => Err(format!(
                "unknown id policy '{other}' (expected 'sequence' or 'tail')"
            )),
        }
    }
}

#[derive(Default)]
struct Registry {
    employees: Vec<Employee>,
    next_id: u64,
}

impl Registry {
    fn position(&self, id: u64) -> Result<usize, ApiError> {
        self.employees
            .iter()
            .position(|e| e.id == id)
            .ok_or(ApiError::NotFound)
    }

    fn allocate_id(&mut self, policy: IdPolicy) -> u64 {
        match policy {
            IdPolicy::Sequence => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
            IdPolicy::FollowTail => self.employees.last().map_or(0, |last| last.id + 1),
        }
    }
}

/// InMemoryEmployeeRepository
///
/// Insertion-ordered `Vec` behind one mutex. Id allocation and the append happen
/// under the same guard, so concurrent creates cannot hand out the same id.
pub struct InMemoryEmployeeRepository {
    policy: IdPolicy,
    inner: Mutex<Registry>,
}

impl InMemoryEmployeeRepository {
    pub fn new(policy: IdPolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(Registry::default()),
        }
    }
}

impl Default for InMemoryEmployeeRepository {
    fn default() -> Self {
        Self::new(IdPolicy::default())
    }
}

impl Repository for InMemoryEmployeeRepository {
    fn list(&self) -> Vec<Employee> {
        self.inner.lock().employees.clone()
    }

    fn get(&self, id: u64) -> Result<Employee, ApiError> {
        let registry = self.inner.lock();
        let index = registry.position(id)?;
        Ok(registry.employees[index].clone())
    }

    fn create(&self, req: CreateEmployeeRequest) -> Employee {
        let mut registry = self.inner.lock();
        let employee = Employee {
            id: registry.allocate_id(self.policy),
            full_name: req.full_name,
            age: req.age,
            email: req.email,
        };
        registry.employees.push(employee.clone());
        tracing::info!(id = employee.id, "employee created");
        employee
    }

    fn update(&self, id: u64, patch: EmployeePatch) -> Result<Employee, ApiError> {
        let mut registry = self.inner.lock();
        let index = registry.position(id)?;

        // Build the modified copy first so a bad age leaves the record untouched.
        let mut employee = registry.employees[index].clone();
        if let Some(full_name) = patch.full_name.filter(|v| !v.is_empty()) {
            employee.full_name = full_name;
        }
        if let Some(age) = patch.age.filter(|v| !v.is_empty()) {
            employee.age = age
                .trim()
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("invalid age '{age}'")))?;
        }
        if let Some(email) = patch.email.filter(|v| !v.is_empty()) {
            employee.email = email;
        }

        registry.employees[index] = employee.clone();
        tracing::info!(id, "employee updated");
        Ok(employee)
    }

    fn remove(&self, id: u64) -> Result<(), ApiError> {
        let mut registry = self.inner.lock();
        let index = registry.position(id)?;
        registry.employees.remove(index);
        tracing::info!(id, "employee removed");
        Ok(())
    }
}
