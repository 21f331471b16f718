use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{Error, Result};
use crate::models::user::{ProviderProfile, Role, User};
use crate::utils::crypto::hash_password;

/// Number of trailing sender-id characters used to disambiguate names.
pub const NAME_SUFFIX_LEN: usize = 5;

const STAFF_FILTER: &str = "role IN ('owner', 'admin', 'staff')";

#[derive(Clone)]
pub struct IdentityService {
    pool: SqlitePool,
}

impl IdentityService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_customer(&self, id: i64) -> Result<User> {
        match self.get_user(id).await? {
            Some(user) if !user.is_staff() && user.line_user_id.is_some() => Ok(user),
            _ => Err(Error::NotFound(format!("Customer {} not found", id))),
        }
    }

    pub async fn get_staff(&self, id: i64) -> Result<User> {
        match self.get_user(id).await? {
            Some(user) if user.is_staff() => Ok(user),
            _ => Err(Error::NotFound(format!("Staff member {} not found", id))),
        }
    }

    pub async fn find_staff_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = format!("SELECT * FROM users WHERE username = ? AND {}", STAFF_FILTER);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_staff(&self) -> Result<Vec<User>> {
        let mut conn = self.pool.acquire().await?;
        list_staff(&mut conn).await
    }

    pub async fn create_staff(&self, username: &str, password: &str, role: Role) -> Result<User> {
        if !role.is_staff() {
            return Err(Error::BadRequest("Staff accounts need a staff role".into()));
        }
        let username = username.trim();
        let mut tx = self.pool.begin().await?;
        if name_holder(&mut tx, username).await?.is_some() {
            return Err(Error::BadRequest(format!(
                "Username {} is already taken",
                username
            )));
        }

        let first_staff = list_staff(&mut tx).await?.is_empty();
        let password_hash = hash_password(password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        // Inbound rows stored while nobody was on staff belong to the first member.
        if first_staff {
            let adopted = sqlx::query(
                "UPDATE messages SET recipient_id = ? WHERE recipient_id IS NULL",
            )
            .bind(user.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if adopted > 0 {
                tracing::info!(staff_id = user.id, adopted, "unaddressed messages assigned");
            }
        }
        tx.commit().await?;

        tracing::info!(staff_id = user.id, role = role.as_str(), "staff account created");
        Ok(user)
    }

    /// Creates the first owner account when no staff exists yet.
    pub async fn ensure_owner(&self, username: &str, password: &str) -> Result<Option<User>> {
        if !self.list_staff().await?.is_empty() {
            return Ok(None);
        }
        self.create_staff(username, password, Role::Owner)
            .await
            .map(Some)
    }

    pub async fn update_customer_details(
        &self,
        id: i64,
        phone: Option<String>,
        note: Option<String>,
    ) -> Result<User> {
        let customer = self.get_customer(id).await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET phone = COALESCE(?, phone), note = COALESCE(?, note)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(phone)
        .bind(note)
        .bind(customer.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

pub async fn list_staff(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    let query = format!("SELECT * FROM users WHERE {} ORDER BY id ASC", STAFF_FILTER);
    let staff = sqlx::query_as::<_, User>(&query).fetch_all(conn).await?;
    Ok(staff)
}

pub async fn find_by_line_user_id(
    conn: &mut SqliteConnection,
    line_user_id: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE line_user_id = ?")
        .bind(line_user_id)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

async fn name_holder(conn: &mut SqliteConnection, username: &str) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Picks the first free name out of `name`, `name_<tail>` and
/// `name_<line user id>`. The last one is unique because LINE ids are.
async fn unique_username(
    conn: &mut SqliteConnection,
    desired: &str,
    tail: &str,
    line_user_id: &str,
) -> Result<String> {
    if name_holder(&mut *conn, desired).await?.is_none() {
        return Ok(desired.to_string());
    }
    let suffixed = format!("{}_{}", desired, tail);
    if name_holder(&mut *conn, &suffixed).await?.is_none() {
        return Ok(suffixed);
    }
    Ok(format!("{}_{}", desired, line_user_id))
}

fn sender_tail(line_user_id: &str) -> String {
    let chars: Vec<char> = line_user_id.chars().collect();
    let start = chars.len().saturating_sub(NAME_SUFFIX_LEN);
    chars[start..].iter().collect()
}

/// Maps a LINE sender to its customer identity, creating it on first
/// contact. Runs on the caller's connection and never commits, so the
/// identity lands together with the message that provoked it.
pub async fn resolve_customer(
    conn: &mut SqliteConnection,
    line_user_id: &str,
    profile: Option<&ProviderProfile>,
) -> Result<User> {
    if let Some(existing) = find_by_line_user_id(&mut *conn, line_user_id).await? {
        return match profile {
            Some(profile) => reconcile_profile(conn, existing, profile).await,
            None => Ok(existing),
        };
    }

    let tail = sender_tail(line_user_id);
    let desired = profile
        .map(|p| p.display_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("line_{}", tail));

    let username = unique_username(&mut *conn, &desired, &tail, line_user_id).await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, role, line_user_id, picture_url, created_at)
        VALUES (?, 'guest', ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&username)
    .bind(line_user_id)
    .bind(profile.and_then(|p| p.picture_url.clone()))
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    tracing::info!(customer_id = user.id, username = %user.username, "customer identity created");
    Ok(user)
}

async fn reconcile_profile(
    conn: &mut SqliteConnection,
    mut user: User,
    profile: &ProviderProfile,
) -> Result<User> {
    if profile.picture_url != user.picture_url {
        sqlx::query("UPDATE users SET picture_url = ? WHERE id = ?")
            .bind(&profile.picture_url)
            .bind(user.id)
            .execute(&mut *conn)
            .await?;
        user.picture_url = profile.picture_url.clone();
    }

    let desired = profile.display_name.trim();
    if !desired.is_empty() && desired != user.username {
        match name_holder(&mut *conn, desired).await? {
            None => {
                sqlx::query("UPDATE users SET username = ? WHERE id = ?")
                    .bind(desired)
                    .bind(user.id)
                    .execute(&mut *conn)
                    .await?;
                tracing::debug!(customer_id = user.id, from = %user.username, to = desired, "display name updated");
                user.username = desired.to_string();
            }
            Some(holder) => {
                tracing::debug!(customer_id = user.id, holder, "display name held by another identity, keeping stored name");
            }
        }
    }

    Ok(user)
}
