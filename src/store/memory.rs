use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{
    AttendanceFilter, DUPLICATE_CHECK_IN, DUPLICATE_EMAIL, EmployeeFilter, Page, Store,
    StoreError, StoreResult,
};
use crate::model::{
    attendance::{AttendanceRecord, CheckOutUpdate, NewCheckIn},
    employee::{Employee, NewEmployee},
};

#[derive(Default)]
struct Inner {
    employees: BTreeMap<u64, Employee>,
    emails: HashMap<String, u64>,
    records: BTreeMap<u64, AttendanceRecord>,
    /// (employee, date) -> record id; the uniqueness gate for check-ins.
    days: HashMap<(u64, NaiveDate), u64>,
    next_employee_id: u64,
    next_record_id: u64,
}

/// Process-local store with the same uniqueness rules as the MySQL schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_employee(&self, new: NewEmployee) -> StoreResult<Employee> {
        let mut inner = self.lock();
        let email = new.email.to_lowercase();
        if inner.emails.contains_key(&email) {
            return Err(StoreError::Duplicate(DUPLICATE_EMAIL.into()));
        }
        inner.next_employee_id += 1;
        let employee = Employee {
            id: inner.next_employee_id,
            employee_id: new.employee_id,
            name: new.name,
            email: email.clone(),
            department: new.department,
            role: new.role,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        inner.emails.insert(email, employee.id);
        inner.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.lock().employees.get(&id).cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let inner = self.lock();
        Ok(inner
            .emails
            .get(&email.to_lowercase())
            .and_then(|id| inner.employees.get(id))
            .cloned())
    }

    async fn find_employee_by_name(&self, name: &str) -> StoreResult<Option<Employee>> {
        let name = name.to_lowercase();
        Ok(self
            .lock()
            .employees
            .values()
            .find(|e| e.name.to_lowercase() == name)
            .cloned())
    }

    async fn employees_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<Employee>> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.employees.get(id))
            .cloned()
            .collect())
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        Ok(self
            .lock()
            .employees
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn count_employees(&self) -> StoreResult<u64> {
        Ok(self.lock().employees.len() as u64)
    }

    async fn update_profile(
        &self,
        id: u64,
        name: Option<String>,
        department: Option<String>,
    ) -> StoreResult<Option<Employee>> {
        let mut inner = self.lock();
        let Some(employee) = inner.employees.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            employee.name = name;
        }
        if let Some(department) = department {
            employee.department = Some(department);
        }
        Ok(Some(employee.clone()))
    }

    async fn all_emails(&self) -> StoreResult<Vec<String>> {
        Ok(self.lock().emails.keys().cloned().collect())
    }

    async fn insert_check_in(&self, new: NewCheckIn) -> StoreResult<AttendanceRecord> {
        let mut inner = self.lock();
        let key = (new.employee_ref, new.date);
        if inner.days.contains_key(&key) {
            return Err(StoreError::Duplicate(DUPLICATE_CHECK_IN.into()));
        }
        inner.next_record_id += 1;
        let record = AttendanceRecord {
            id: inner.next_record_id,
            employee_ref: new.employee_ref,
            date: new.date,
            check_in_time: Some(new.check_in_time),
            check_out_time: None,
            status: new.status,
            total_hours: 0.0,
            created_at: Utc::now(),
        };
        inner.days.insert(key, record.id);
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn close_record(
        &self,
        id: u64,
        update: &CheckOutUpdate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let mut inner = self.lock();
        match inner.records.get_mut(&id) {
            Some(record) if !record.is_checked_out() => {
                record.check_out_time = Some(update.check_out_time);
                record.status = update.status;
                record.total_hours = update.total_hours;
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_record(
        &self,
        employee_ref: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let inner = self.lock();
        Ok(inner
            .days
            .get(&(employee_ref, date))
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn list_records(
        &self,
        filter: &AttendanceFilter,
        page: Option<Page>,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let inner = self.lock();
        let mut records: Vec<AttendanceRecord> = inner
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));

        Ok(match page {
            Some(p) => records
                .into_iter()
                .skip(p.offset as usize)
                .take(p.limit as usize)
                .collect(),
            None => records,
        })
    }

    async fn count_records(&self, filter: &AttendanceFilter) -> StoreResult<u64> {
        Ok(self
            .lock()
            .records
            .values()
            .filter(|r| filter.matches(r))
            .count() as u64)
    }
}
