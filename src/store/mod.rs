//! Persistence seam. Handlers only ever see `dyn Store`; the MySQL-backed
//! implementation is used when a database is reachable and the in-memory one
//! otherwise (and in tests).

use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::Display;

use crate::model::{
    attendance::{AttendanceRecord, CheckOutUpdate, NewCheckIn, Status},
    employee::{Employee, NewEmployee},
    role::Role,
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[display(fmt = "{}", _0)]
    Duplicate(String),
    #[display(fmt = "{:#}", _0)]
    Backend(anyhow::Error),
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

pub const DUPLICATE_CHECK_IN: &str = "Already checked in today";
pub const DUPLICATE_EMAIL: &str = "Email already registered";

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub role: Option<Role>,
    /// Case-insensitive substring match on the display name.
    pub name_contains: Option<String>,
    /// Case-insensitive substring match on the department.
    pub department_contains: Option<String>,
    pub id: Option<u64>,
}

impl EmployeeFilter {
    pub fn roster() -> Self {
        Self {
            role: Some(Role::Employee),
            ..Self::default()
        }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        if self.role.is_some_and(|r| r != employee.role) {
            return false;
        }
        if self.id.is_some_and(|id| id != employee.id) {
            return false;
        }
        if let Some(needle) = &self.name_contains {
            if !contains_ignore_case(&employee.name, needle) {
                return false;
            }
        }
        if let Some(needle) = &self.department_contains {
            match &employee.department {
                Some(dept) if contains_ignore_case(dept, needle) => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    /// Restrict to these employees. `Some(vec![])` matches nothing.
    pub employee_refs: Option<Vec<u64>>,
    pub date: Option<NaiveDate>,
    /// Inclusive `(from, to)`.
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub status: Option<Status>,
}

impl AttendanceFilter {
    pub fn for_employee(employee_ref: u64) -> Self {
        Self {
            employee_refs: Some(vec![employee_ref]),
            ..Self::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.range = Some((from, to));
        self
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        if let Some(refs) = &self.employee_refs {
            if !refs.contains(&record.employee_ref) {
                return false;
            }
        }
        if self.date.is_some_and(|d| d != record.date) {
            return false;
        }
        if let Some((from, to)) = self.range {
            if record.date < from || record.date > to {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    /// 1-based page number.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(limit),
            limit,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    // -------- employees --------
    async fn create_employee(&self, new: NewEmployee) -> StoreResult<Employee>;
    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>>;
    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>>;
    /// Exact, case-insensitive name match.
    async fn find_employee_by_name(&self, name: &str) -> StoreResult<Option<Employee>>;
    async fn employees_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<Employee>>;
    /// Ordered by id.
    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>>;
    async fn count_employees(&self) -> StoreResult<u64>;
    async fn update_profile(
        &self,
        id: u64,
        name: Option<String>,
        department: Option<String>,
    ) -> StoreResult<Option<Employee>>;
    async fn all_emails(&self) -> StoreResult<Vec<String>>;

    // -------- attendance --------
    /// Fails with `StoreError::Duplicate` when the employee already has a
    /// record for that date.
    async fn insert_check_in(&self, new: NewCheckIn) -> StoreResult<AttendanceRecord>;
    /// Applies the update only if the record is still open. `None` means the
    /// record was already closed (or does not exist).
    async fn close_record(
        &self,
        id: u64,
        update: &CheckOutUpdate,
    ) -> StoreResult<Option<AttendanceRecord>>;
    async fn find_record(
        &self,
        employee_ref: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;
    /// Newest date first.
    async fn list_records(
        &self,
        filter: &AttendanceFilter,
        page: Option<Page>,
    ) -> StoreResult<Vec<AttendanceRecord>>;
    async fn count_records(&self, filter: &AttendanceFilter) -> StoreResult<u64>;
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
