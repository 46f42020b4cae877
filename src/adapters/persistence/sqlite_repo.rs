//! SQLite-backed registry via libsql. Implements RegistryPort.
//!
//! One database file (registry.db) in the given base directory; schema is
//! created on connect. Group membership keeps join order through a separate
//! members table ordered by rowid. Stale-water expiry and purge are single
//! SQL statements over the supplies table.

use crate::domain::{
    AllocationTarget, DisasterVictim, DomainError, FamilyGroup, Gender, Inquiry, Supply,
    SupplyKind, SupplyStatus, WATER_SHELF_LIFE_HOURS,
};
use crate::ports::{AssignOutcome, RegistryPort};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use libsql::{params, Connection, Database};
use std::path::{Path, PathBuf};
use tracing::info;

const VICTIMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS disaster_victims (
    first_name TEXT NOT NULL,
    entry_date TEXT NOT NULL,
    gender TEXT NOT NULL DEFAULT 'UNSPECIFIED',
    family_group_id INTEGER
)"#;

const GROUPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS family_groups (
    group_id INTEGER PRIMARY KEY,
    head_name TEXT NOT NULL
)"#;

/// Join order = rowid order; one row per membership.
const GROUP_MEMBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS family_group_members (
    group_id INTEGER NOT NULL,
    member_name TEXT NOT NULL
)"#;

const SUPPLIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS supplies (
    kind TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    location TEXT,
    person TEXT,
    allocated_at INTEGER NOT NULL,
    expired INTEGER NOT NULL DEFAULT 0
)"#;

const INQUIRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inquiries (
    inquirer_name TEXT NOT NULL,
    known_victim INTEGER NOT NULL,
    missing_person TEXT NOT NULL,
    date_of_inquiry TEXT NOT NULL
)"#;

/// SQLite registry. One database file (registry.db) in the base directory.
pub struct SqliteRegistry {
    db: Database,
}

impl SqliteRegistry {
    /// Connect to (or create) the database and ensure the schema exists.
    /// Call once at startup; the returned repo is safe to share via Arc.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Storage(e.to_string()))?;
        let db_path: PathBuf = base.join("registry.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Storage(e.to_string()))?;

        // WAL mode: concurrent readers + one writer. PRAGMA returns a row,
        // so use query and drain (execute fails when rows come back).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Storage(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .is_some()
        {}

        for ddl in [
            VICTIMS_TABLE,
            GROUPS_TABLE,
            GROUP_MEMBERS_TABLE,
            SUPPLIES_TABLE,
            INQUIRIES_TABLE,
        ] {
            conn.execute(ddl, ())
                .await
                .map_err(|e| DomainError::Storage(e.to_string()))?;
        }

        info!(path = %db_path.display(), "SQLite registry connected");
        Ok(Self { db })
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db
            .connect()
            .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn victim_from_row(row: &libsql::Row) -> Result<DisasterVictim, DomainError> {
        let first_name: String = row.get(0).map_err(|e| DomainError::Storage(e.to_string()))?;
        let entry_date: String = row.get(1).map_err(|e| DomainError::Storage(e.to_string()))?;
        let gender: String = row.get(2).map_err(|e| DomainError::Storage(e.to_string()))?;
        let family_group_id: Option<i64> = row.get(3).ok();
        let entry_date = NaiveDate::parse_from_str(&entry_date, "%Y-%m-%d")
            .map_err(|e| DomainError::Storage(format!("corrupt entry_date: {}", e)))?;
        let gender = Gender::parse(&gender)
            .map_err(|_| DomainError::Storage(format!("corrupt gender '{}'", gender)))?;
        Ok(DisasterVictim::from_parts(
            first_name,
            entry_date,
            gender,
            family_group_id,
        ))
    }

    fn supply_from_row(row: &libsql::Row) -> Result<Supply, DomainError> {
        let kind: String = row.get(0).map_err(|e| DomainError::Storage(e.to_string()))?;
        let quantity: i64 = row.get(1).map_err(|e| DomainError::Storage(e.to_string()))?;
        let location: Option<String> = row.get(2).ok();
        let person: Option<String> = row.get(3).ok();
        let allocated_at: i64 = row.get(4).map_err(|e| DomainError::Storage(e.to_string()))?;
        let expired: i64 = row.get(5).map_err(|e| DomainError::Storage(e.to_string()))?;

        let kind = SupplyKind::parse(&kind)
            .map_err(|_| DomainError::Storage(format!("corrupt supply kind '{}'", kind)))?;
        let target = AllocationTarget::resolve(location, person)
            .map_err(|e| DomainError::Storage(format!("corrupt allocation target: {}", e)))?;
        let allocated_at = DateTime::<Utc>::from_timestamp(allocated_at, 0)
            .ok_or_else(|| DomainError::Storage("corrupt allocation timestamp".into()))?;
        let status = if expired != 0 {
            SupplyStatus::Expired
        } else {
            SupplyStatus::Active
        };
        Ok(Supply::from_parts(
            kind,
            quantity as u32,
            target,
            allocated_at,
            status,
        ))
    }
}

#[async_trait::async_trait]
impl RegistryPort for SqliteRegistry {
    async fn find_victim(&self, name: &str) -> Result<Option<DisasterVictim>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT first_name, entry_date, gender, family_group_id
                 FROM disaster_victims WHERE first_name = ?1 LIMIT 1",
                params![name],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        match rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        {
            Some(row) => Ok(Some(Self::victim_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn save_victim(&self, victim: &DisasterVictim) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO disaster_victims (first_name, entry_date, gender, family_group_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                victim.first_name(),
                victim.entry_date().format("%Y-%m-%d").to_string(),
                victim.gender().as_str(),
                victim.family_group_id()
            ],
        )
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_victim_name(&self, name: &str, new_name: &str) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let changed = tx
            .execute(
                "UPDATE disaster_victims SET first_name = ?1 WHERE first_name = ?2",
                params![new_name, name],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        // Member rows carry the same name; keep both in step.
        tx.execute(
            "UPDATE family_group_members SET member_name = ?1 WHERE member_name = ?2",
            params![new_name, name],
        )
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;
        tx.commit()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(changed > 0)
    }

    async fn update_victim_entry_date(
        &self,
        name: &str,
        entry_date: NaiveDate,
    ) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE disaster_victims SET entry_date = ?1 WHERE first_name = ?2",
                params![entry_date.format("%Y-%m-%d").to_string(), name],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(changed > 0)
    }

    async fn update_victim_gender(&self, name: &str, gender: Gender) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE disaster_victims SET gender = ?1 WHERE first_name = ?2",
                params![gender.as_str(), name],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(changed > 0)
    }

    async fn victim_exists(&self, name: &str) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM disaster_victims WHERE first_name = ?1",
                params![name],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .ok_or_else(|| DomainError::Storage("COUNT returned no row".into()))?;
        let count: i64 = row.get(0).map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(count > 0)
    }

    async fn list_victims(&self) -> Result<Vec<DisasterVictim>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT first_name, entry_date, gender, family_group_id
                 FROM disaster_victims ORDER BY rowid",
                (),
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut victims = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        {
            victims.push(Self::victim_from_row(&row)?);
        }
        Ok(victims)
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<FamilyGroup>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT head_name FROM family_groups WHERE group_id = ?1",
                params![group_id],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        else {
            return Ok(None);
        };
        let head_name: String = row.get(0).map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut group = FamilyGroup::new(group_id, &head_name);

        let mut members = conn
            .query(
                "SELECT member_name FROM family_group_members WHERE group_id = ?1 ORDER BY rowid",
                params![group_id],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        while let Some(row) = members
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        {
            let name: String = row.get(0).map_err(|e| DomainError::Storage(e.to_string()))?;
            group.add_member_name(&name);
        }
        Ok(Some(group))
    }

    async fn save_group(&self, group: &FamilyGroup) -> Result<(), DomainError> {
        let conn = self.conn()?;
        // PRIMARY KEY refuses duplicate ids; surface that as a conflict.
        conn.execute(
            "INSERT INTO family_groups (group_id, head_name) VALUES (?1, ?2)",
            params![group.group_id(), group.head_name()],
        )
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("PRIMARY KEY") {
                DomainError::Conflict(format!("family group {} already exists", group.group_id()))
            } else {
                DomainError::Storage(msg)
            }
        })?;
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<FamilyGroup>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT group_id FROM family_groups ORDER BY group_id", ())
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut ids = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        {
            let id: i64 = row.get(0).map_err(|e| DomainError::Storage(e.to_string()))?;
            ids.push(id);
        }
        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(group) = self.find_group(id).await? {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    async fn set_victim_group(
        &self,
        name: &str,
        group_id: i64,
    ) -> Result<AssignOutcome, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT family_group_id FROM disaster_victims WHERE first_name = ?1 LIMIT 1",
                params![name],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        else {
            return Ok(AssignOutcome::NoSuchVictim);
        };
        let current: Option<i64> = row.get(0).ok();
        match current {
            Some(g) if g == group_id => return Ok(AssignOutcome::Assigned),
            Some(_) => return Ok(AssignOutcome::AlreadyGrouped),
            None => {}
        }

        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        tx.execute(
            "UPDATE disaster_victims SET family_group_id = ?1 WHERE first_name = ?2",
            params![group_id, name],
        )
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;
        tx.execute(
            "INSERT INTO family_group_members (group_id, member_name) VALUES (?1, ?2)",
            params![group_id, name],
        )
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;
        tx.commit()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(AssignOutcome::Assigned)
    }

    async fn save_supply(&self, supply: &Supply) -> Result<(), DomainError> {
        let (location, person) = match supply.target() {
            AllocationTarget::Location(l) => (Some(l.as_str()), None),
            AllocationTarget::Person(p) => (None, Some(p.as_str())),
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO supplies (kind, quantity, location, person, allocated_at, expired)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                supply.kind().as_str(),
                supply.quantity() as i64,
                location,
                person,
                supply.allocated_at().timestamp(),
                supply.is_expired() as i64
            ],
        )
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn list_supplies(&self) -> Result<Vec<Supply>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT kind, quantity, location, person, allocated_at, expired
                 FROM supplies ORDER BY rowid",
                (),
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut supplies = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        {
            supplies.push(Self::supply_from_row(&row)?);
        }
        Ok(supplies)
    }

    async fn expire_stale_water(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let cutoff = (now - Duration::hours(WATER_SHELF_LIFE_HOURS)).timestamp();
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE supplies SET expired = 1
                 WHERE kind = 'water' AND expired = 0 AND allocated_at < ?1",
                params![cutoff],
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(changed)
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM supplies WHERE expired = 1", ())
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(changed)
    }

    async fn save_inquiry(&self, inquiry: &Inquiry) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO inquiries (inquirer_name, known_victim, missing_person, date_of_inquiry)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                inquiry.inquirer_name(),
                inquiry.known_victim() as i64,
                inquiry.missing_person(),
                inquiry.inquiry_date().format("%Y-%m-%d").to_string()
            ],
        )
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn list_inquiries(&self) -> Result<Vec<Inquiry>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT inquirer_name, known_victim, missing_person, date_of_inquiry
                 FROM inquiries ORDER BY rowid",
                (),
            )
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut inquiries = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        {
            let inquirer: String = row.get(0).map_err(|e| DomainError::Storage(e.to_string()))?;
            let known: i64 = row.get(1).map_err(|e| DomainError::Storage(e.to_string()))?;
            let missing: String = row.get(2).map_err(|e| DomainError::Storage(e.to_string()))?;
            let date: String = row.get(3).map_err(|e| DomainError::Storage(e.to_string()))?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DomainError::Storage(format!("corrupt inquiry date: {}", e)))?;
            inquiries.push(Inquiry::from_parts(inquirer, known != 0, missing, date));
        }
        Ok(inquiries)
    }
}
