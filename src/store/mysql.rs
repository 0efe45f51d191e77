use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySqlPool, prelude::FromRow};

use super::{
    AttendanceFilter, DUPLICATE_CHECK_IN, DUPLICATE_EMAIL, EmployeeFilter, Page, Store,
    StoreError, StoreResult,
};
use crate::model::{
    attendance::{AttendanceRecord, CheckOutUpdate, NewCheckIn, Status},
    employee::{Employee, NewEmployee},
    role::Role,
};

const EMPLOYEE_COLUMNS: &str =
    "id, employee_code, name, email, department, role, password_hash, created_at";
const RECORD_COLUMNS: &str =
    "id, employee_id, date, check_in_time, check_out_time, status, total_hours, created_at";

// Typed bind values for the dynamically assembled WHERE clauses.
#[derive(Debug, Clone, PartialEq)]
enum FilterValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

macro_rules! bind_all {
    ($query:expr, $args:expr) => {{
        let mut q = $query;
        for arg in $args {
            q = match arg {
                FilterValue::U64(v) => q.bind(*v),
                FilterValue::Str(s) => q.bind(s.as_str()),
                FilterValue::Date(d) => q.bind(*d),
            };
        }
        q
    }};
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    employee_code: String,
    name: String,
    email: String,
    department: Option<String>,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| backend(format!("unknown role {:?} on employee {}", row.role, row.id)))?;
        Ok(Employee {
            id: row.id,
            employee_id: row.employee_code,
            name: row.name,
            email: row.email,
            department: row.department,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct RecordRow {
    id: u64,
    employee_id: u64,
    date: NaiveDate,
    check_in_time: Option<DateTime<Utc>>,
    check_out_time: Option<DateTime<Utc>>,
    status: String,
    total_hours: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let status: Status = row
            .status
            .parse()
            .map_err(|_| backend(format!("unknown status {:?} on record {}", row.status, row.id)))?;
        Ok(AttendanceRecord {
            id: row.id,
            employee_ref: row.employee_id,
            date: row.date,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            status,
            total_hours: row.total_hours,
            created_at: row.created_at,
        })
    }
}

fn backend(msg: String) -> StoreError {
    StoreError::Backend(anyhow::anyhow!(msg))
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.into())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23000"),
        _ => false,
    }
}

/// Lowercased `%needle%` with LIKE wildcards in the needle matched literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn employee_where(filter: &EmployeeFilter) -> (String, Vec<FilterValue>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(role) = filter.role {
        sql.push_str(" AND role = ?");
        args.push(FilterValue::Str(role.to_string()));
    }
    if let Some(id) = filter.id {
        sql.push_str(" AND id = ?");
        args.push(FilterValue::U64(id));
    }
    if let Some(name) = &filter.name_contains {
        sql.push_str(" AND LOWER(name) LIKE ?");
        args.push(FilterValue::Str(contains_pattern(name)));
    }
    if let Some(dept) = &filter.department_contains {
        sql.push_str(" AND LOWER(department) LIKE ?");
        args.push(FilterValue::Str(contains_pattern(dept)));
    }
    (sql, args)
}

fn attendance_where(filter: &AttendanceFilter) -> (String, Vec<FilterValue>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(refs) = &filter.employee_refs {
        if refs.is_empty() {
            sql.push_str(" AND 1=0");
        } else {
            let marks = vec!["?"; refs.len()].join(", ");
            sql.push_str(&format!(" AND employee_id IN ({})", marks));
            args.extend(refs.iter().copied().map(FilterValue::U64));
        }
    }
    if let Some(date) = filter.date {
        sql.push_str(" AND date = ?");
        args.push(FilterValue::Date(date));
    }
    if let Some((from, to)) = filter.range {
        sql.push_str(" AND date BETWEEN ? AND ?");
        args.push(FilterValue::Date(from));
        args.push(FilterValue::Date(to));
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }
    (sql, args)
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn employee_where_one(
        &self,
        condition: &str,
        arg: FilterValue,
    ) -> StoreResult<Option<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE {} LIMIT 1",
            EMPLOYEE_COLUMNS, condition
        );
        let args = [arg];
        let row = bind_all!(sqlx::query_as::<_, EmployeeRow>(&sql), &args)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Employee::try_from).transpose()
    }

    async fn record_by_id(&self, id: u64) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {} FROM attendance WHERE id = ?", RECORD_COLUMNS);
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(AttendanceRecord::try_from).transpose()
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn create_employee(&self, new: NewEmployee) -> StoreResult<Employee> {
        let email = new.email.to_lowercase();
        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (employee_code, name, email, department, role, password_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.employee_id)
        .bind(&new.name)
        .bind(&email)
        .bind(new.department.as_deref())
        .bind(new.role.to_string())
        .bind(&new.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(DUPLICATE_EMAIL.into())
            } else {
                db_error(e)
            }
        })?;

        self.find_employee(result.last_insert_id())
            .await?
            .ok_or_else(|| backend("inserted employee vanished".into()))
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        self.employee_where_one("id = ?", FilterValue::U64(id)).await
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        self.employee_where_one("email = ?", FilterValue::Str(email.to_lowercase()))
            .await
    }

    async fn find_employee_by_name(&self, name: &str) -> StoreResult<Option<Employee>> {
        self.employee_where_one("LOWER(name) = ?", FilterValue::Str(name.to_lowercase()))
            .await
    }

    async fn employees_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<Employee>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let marks = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM employees WHERE id IN ({}) ORDER BY id",
            EMPLOYEE_COLUMNS, marks
        );
        let args: Vec<FilterValue> = ids.iter().copied().map(FilterValue::U64).collect();
        let rows = bind_all!(sqlx::query_as::<_, EmployeeRow>(&sql), &args)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let (where_sql, args) = employee_where(filter);
        let sql = format!(
            "SELECT {} FROM employees{} ORDER BY id",
            EMPLOYEE_COLUMNS, where_sql
        );
        let rows = bind_all!(sqlx::query_as::<_, EmployeeRow>(&sql), &args)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn count_employees(&self) -> StoreResult<u64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(total.max(0) as u64)
    }

    async fn update_profile(
        &self,
        id: u64,
        name: Option<String>,
        department: Option<String>,
    ) -> StoreResult<Option<Employee>> {
        sqlx::query(
            r#"
            UPDATE employees
            SET name = COALESCE(?, name),
                department = COALESCE(?, department)
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(department)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        self.find_employee(id).await
    }

    async fn all_emails(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT email FROM employees")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn insert_check_in(&self, new: NewCheckIn) -> StoreResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in_time, status, total_hours)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(new.employee_ref)
        .bind(new.date)
        .bind(new.check_in_time)
        .bind(new.status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(DUPLICATE_CHECK_IN.into())
            } else {
                db_error(e)
            }
        })?;

        self.record_by_id(result.last_insert_id())
            .await?
            .ok_or_else(|| backend("inserted attendance record vanished".into()))
    }

    async fn close_record(
        &self,
        id: u64,
        update: &CheckOutUpdate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out_time = ?, status = ?, total_hours = ?
            WHERE id = ?
            AND check_out_time IS NULL
            "#,
        )
        .bind(update.check_out_time)
        .bind(update.status.to_string())
        .bind(update.total_hours)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.record_by_id(id).await
    }

    async fn find_record(
        &self,
        employee_ref: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {} FROM attendance WHERE employee_id = ? AND date = ?",
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(employee_ref)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn list_records(
        &self,
        filter: &AttendanceFilter,
        page: Option<Page>,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let (where_sql, args) = attendance_where(filter);
        let mut sql = format!(
            "SELECT {} FROM attendance{} ORDER BY date DESC, id ASC",
            RECORD_COLUMNS, where_sql
        );
        if page.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut q = bind_all!(sqlx::query_as::<_, RecordRow>(&sql), &args);
        if let Some(p) = page {
            q = q.bind(p.limit).bind(p.offset);
        }
        let rows = q.fetch_all(&self.pool).await.map_err(db_error)?;
        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn count_records(&self, filter: &AttendanceFilter) -> StoreResult<u64> {
        let (where_sql, args) = attendance_where(filter);
        let sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);
        let total = bind_all!(sqlx::query_scalar::<_, i64>(&sql), &args)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(total.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_where_binds_in_clause_order() {
        let from = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let filter = AttendanceFilter {
            employee_refs: Some(vec![4, 9]),
            status: Some(Status::HalfDay),
            ..AttendanceFilter::default()
        }
        .between(from, to);

        let (sql, args) = attendance_where(&filter);
        assert_eq!(
            sql,
            " WHERE 1=1 AND employee_id IN (?, ?) AND date BETWEEN ? AND ? AND status = ?"
        );
        assert_eq!(
            args,
            vec![
                FilterValue::U64(4),
                FilterValue::U64(9),
                FilterValue::Date(from),
                FilterValue::Date(to),
                FilterValue::Str("half-day".into()),
            ]
        );
    }

    #[test]
    fn empty_employee_set_matches_nothing() {
        let filter = AttendanceFilter {
            employee_refs: Some(vec![]),
            ..AttendanceFilter::default()
        };
        let (sql, args) = attendance_where(&filter);
        assert!(sql.ends_with(" AND 1=0"));
        assert!(args.is_empty());
    }

    #[test]
    fn employee_where_lowercases_substring_patterns() {
        let filter = EmployeeFilter {
            role: Some(Role::Employee),
            department_contains: Some("Eng".into()),
            ..EmployeeFilter::default()
        };
        let (sql, args) = employee_where(&filter);
        assert_eq!(sql, " WHERE 1=1 AND role = ? AND LOWER(department) LIKE ?");
        assert_eq!(
            args,
            vec![
                FilterValue::Str("employee".into()),
                FilterValue::Str("%eng%".into()),
            ]
        );
    }

    #[test]
    fn like_wildcards_in_input_are_literal() {
        let filter = EmployeeFilter {
            name_contains: Some("50%_Off".into()),
            department_contains: Some(r"R\D".into()),
            ..EmployeeFilter::default()
        };
        let (_, args) = employee_where(&filter);
        assert_eq!(
            args,
            vec![
                FilterValue::Str(r"%50\%\_off%".into()),
                FilterValue::Str(r"%r\\d%".into()),
            ]
        );
        assert_eq!(contains_pattern("_"), r"%\_%");
    }
}
