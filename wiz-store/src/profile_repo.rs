use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use wiz_core::{BoxError, ProfileRepository, Role, UserProfile};

use crate::StoreError;

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    uid: String,
    email: String,
    display_name: String,
    role: String,
    joined_at: DateTime<Utc>,
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, BoxError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT uid, email, display_name, role, joined_at FROM user_profiles WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Corrupt(format!("profile {} has role {:?}", row.uid, row.role)))?;

        Ok(Some(UserProfile {
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            role,
            joined_at: row.joined_at,
        }))
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (uid, email, display_name, role, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (uid) DO UPDATE
            SET email = EXCLUDED.email,
                display_name = EXCLUDED.display_name,
                role = EXCLUDED.role
            "#,
        )
        .bind(&profile.uid)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .bind(profile.joined_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
