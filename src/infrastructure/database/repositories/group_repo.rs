use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::entities::{Group, GroupMember, GroupRole};
use crate::domain::repositories::{GroupRepository, RepositoryError};
use crate::infrastructure::database::map_db_error;

/// SQLite implementation of GroupRepository
pub struct SqliteGroupRepository {
    pool: SqlitePool,
}

impl SqliteGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_group(row: &sqlx::sqlite::SqliteRow) -> Group {
        use sqlx::Row;

        Group {
            id: row.get("id"),
            name: row.get("name"),
            owner_id: row.get("owner_id"),
            created_at: row.get("created_at"),
        }
    }

    fn row_to_member(row: &sqlx::sqlite::SqliteRow) -> GroupMember {
        use sqlx::Row;

        let role_str: String = row.get("role");

        GroupMember {
            group_id: row.get("group_id"),
            user_id: row.get("user_id"),
            role: GroupRole::from_str(&role_str).unwrap_or(GroupRole::Member),
            joined_at: row.get("joined_at"),
        }
    }
}

#[async_trait]
impl GroupRepository for SqliteGroupRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Group>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(Self::row_to_group))
    }

    async fn create(&self, group: &Group) -> Result<GroupMember, RepositoryError> {
        let owner = GroupMember {
            group_id: group.id.clone(),
            user_id: group.owner_id.clone(),
            role: GroupRole::Owner,
            joined_at: group.created_at,
        };

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("INSERT INTO groups (id, name, owner_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(&group.id)
            .bind(&group.name)
            .bind(&group.owner_id)
            .bind(group.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&owner.group_id)
        .bind(&owner.user_id)
        .bind(owner.role.as_str())
        .bind(owner.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(owner)
    }

    async fn find_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMember>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM group_members WHERE group_id = ? AND user_id = ?")
            .bind(group_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(Self::row_to_member))
    }

    async fn add_member(&self, member: &GroupMember) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&member.group_id)
        .bind(&member.user_id)
        .bind(member.role.as_str())
        .bind(member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMember>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM group_members WHERE group_id = ? ORDER BY joined_at ASC, rowid ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.iter().map(Self::row_to_member).collect())
    }
}
