//! SQLite-backed store via libsql. Implements the three outbound ports.
//!
//! Single database file holding the member roster, the groups, and the
//! membership join table; assignments are idempotent upserts keyed by
//! (group_id, member_id) and batches run inside one transaction.

use crate::domain::entities::{MemberRole, MemberStatus};
use crate::domain::{Assignment, DomainError, Group, Member, Membership};
use crate::ports::{GroupPort, MembershipPort, RosterPort};
use libsql::{Database, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

const MEMBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    role TEXT NOT NULL DEFAULT 'MEMBER',
    residence TEXT,
    city TEXT,
    county TEXT,
    spouse_id TEXT,
    parent_id TEXT
)"#;

const GROUPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS small_groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    type TEXT,
    is_active INTEGER NOT NULL DEFAULT 1
)"#;

const MEMBERSHIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS group_members (
    group_id TEXT NOT NULL,
    member_id TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    is_leader INTEGER NOT NULL DEFAULT 0,
    joined_at INTEGER NOT NULL,
    left_at INTEGER,
    PRIMARY KEY (group_id, member_id)
)"#;
const MEMBERSHIPS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_group_members_member ON group_members (member_id)";

const UPSERT_MEMBERSHIP: &str = r#"
INSERT INTO group_members (group_id, member_id, role, is_leader, joined_at, left_at)
VALUES (?1, ?2, 'member', 0, ?3, NULL)
ON CONFLICT (group_id, member_id) DO UPDATE SET left_at = NULL
"#;

/// SQLite store. One database file (flock.db) in the given base directory.
pub struct SqliteStore {
    db: Database,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Connect to (or create) the SQLite database and ensure the schema
    /// exists. Call this once at startup; the returned store is safe to
    /// share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL for concurrent read/write
    /// without sacrificing durability.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Store(e.to_string()))?;
        let db_path = base.join("flock.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Store(e.to_string()))?;

        // WAL mode enables concurrent readers + one writer.
        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Store(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
            .is_some()
        {}
        let mut sync_rows = conn
            .query("PRAGMA synchronous=NORMAL", ())
            .await
            .map_err(|e| DomainError::Store(format!("synchronous pragma failed: {}", e)))?;
        while sync_rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
            .is_some()
        {}

        for stmt in [MEMBERS_TABLE, GROUPS_TABLE, MEMBERSHIPS_TABLE, MEMBERSHIPS_INDEX] {
            conn.execute(stmt, ())
                .await
                .map_err(|e| DomainError::Store(e.to_string()))?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connection(&self) -> Result<libsql::Connection, DomainError> {
        self.db.connect().map_err(|e| DomainError::Store(e.to_string()))
    }

    fn parse_status(s: &str) -> MemberStatus {
        if s.eq_ignore_ascii_case("ACTIVE") {
            MemberStatus::Active
        } else {
            MemberStatus::Inactive
        }
    }

    fn parse_role(s: &str) -> MemberRole {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => MemberRole::Admin,
            "PASTOR" => MemberRole::Pastor,
            "LEADER" => MemberRole::Leader,
            "GUEST" => MemberRole::Guest,
            _ => MemberRole::Member,
        }
    }
}

#[async_trait::async_trait]
impl RosterPort for SqliteStore {
    async fn fetch_candidates(&self) -> Result<Vec<Member>, DomainError> {
        let conn = self.connection()?;

        // Children derive from parent_id; scan the full table so candidates
        // see every child id, candidate or not.
        let mut child_rows = conn
            .query(
                "SELECT id, parent_id FROM members WHERE parent_id IS NOT NULL ORDER BY rowid",
                (),
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        while let Some(row) = child_rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            let id: String = row.get(0).map_err(|e| DomainError::Store(e.to_string()))?;
            let parent: String = row.get(1).map_err(|e| DomainError::Store(e.to_string()))?;
            children_of.entry(parent).or_default().push(id);
        }

        // Open memberships with the owning group's type expanded.
        let mut membership_rows = conn
            .query(
                r#"
                SELECT gm.member_id, gm.group_id, sg.type, gm.left_at
                FROM group_members gm
                LEFT JOIN small_groups sg ON sg.id = gm.group_id
                WHERE gm.left_at IS NULL
                "#,
                (),
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut memberships_of: HashMap<String, Vec<Membership>> = HashMap::new();
        while let Some(row) = membership_rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            let member_id: String = row.get(0).map_err(|e| DomainError::Store(e.to_string()))?;
            let group_id: String = row.get(1).map_err(|e| DomainError::Store(e.to_string()))?;
            let group_type: Option<String> = row.get(2).ok();
            let left_at: Option<i64> = row.get(3).ok();
            memberships_of.entry(member_id).or_default().push(Membership {
                group_id,
                group_type,
                left_at,
            });
        }

        let mut rows = conn
            .query(
                r#"
                SELECT id, first_name, last_name, status, role,
                       residence, city, county, spouse_id, parent_id
                FROM members
                WHERE status = 'ACTIVE' AND role != 'GUEST'
                ORDER BY rowid
                "#,
                (),
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut members = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            let id: String = row.get(0).map_err(|e| DomainError::Store(e.to_string()))?;
            let first_name: String = row.get::<String>(1).unwrap_or_default();
            let last_name: String = row.get::<String>(2).unwrap_or_default();
            let status: String = row.get::<String>(3).unwrap_or_default();
            let role: String = row.get::<String>(4).unwrap_or_default();
            let residence: Option<String> = row.get(5).ok();
            let city: Option<String> = row.get(6).ok();
            let county: Option<String> = row.get(7).ok();
            let spouse_id: Option<String> = row.get(8).ok();
            let parent_id: Option<String> = row.get(9).ok();

            members.push(Member {
                child_ids: children_of.remove(&id).unwrap_or_default(),
                memberships: memberships_of.remove(&id).unwrap_or_default(),
                id,
                first_name,
                last_name,
                status: Self::parse_status(&status),
                role: Self::parse_role(&role),
                residence,
                city,
                county,
                spouse_id,
                parent_id,
            });
        }

        Ok(members)
    }
}

#[async_trait::async_trait]
impl GroupPort for SqliteStore {
    async fn fetch_groups(
        &self,
        group_type: &str,
        ids: &[String],
    ) -> Result<Vec<Group>, DomainError> {
        let conn = self.connection()?;
        let mut rows = conn
            .query(
                r#"
                SELECT g.id, g.name, g.type, g.is_active,
                       (SELECT COUNT(*) FROM group_members gm
                        WHERE gm.group_id = g.id AND gm.left_at IS NULL) AS member_count
                FROM small_groups g
                WHERE g.is_active = 1 AND g.type = ?1
                ORDER BY g.rowid
                "#,
                params![group_type],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut groups = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            let id: String = row.get(0).map_err(|e| DomainError::Store(e.to_string()))?;
            if !ids.is_empty() && !ids.contains(&id) {
                continue;
            }
            let name: String = row.get::<String>(1).unwrap_or_default();
            let group_type: Option<String> = row.get(2).ok();
            let is_active: i64 = row.get(3).map_err(|e| DomainError::Store(e.to_string()))?;
            let member_count: i64 = row.get(4).map_err(|e| DomainError::Store(e.to_string()))?;
            groups.push(Group {
                id,
                name,
                group_type,
                is_active: is_active != 0,
                member_count: member_count.max(0) as u32,
            });
        }

        Ok(groups)
    }
}

#[async_trait::async_trait]
impl MembershipPort for SqliteStore {
    async fn upsert_membership(&self, assignment: &Assignment) -> Result<(), DomainError> {
        let conn = self.connection()?;
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            UPSERT_MEMBERSHIP,
            params![assignment.group_id.as_str(), assignment.member_id.as_str(), now],
        )
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn upsert_batch(&self, assignments: &[Assignment]) -> Result<(), DomainError> {
        if assignments.is_empty() {
            return Ok(());
        }
        let conn = self.connection()?;
        let now = chrono::Utc::now().timestamp();
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        for a in assignments {
            tx.execute(
                UPSERT_MEMBERSHIP,
                params![a.group_id.as_str(), a.member_id.as_str(), now],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        info!(count = assignments.len(), "committed assignment batch");
        Ok(())
    }
}
