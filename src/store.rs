//! Durable message store.
//!
//! Messages are append-only; the only later mutation is the idempotent
//! `read` flag. A conversation is not stored, it is derived from the
//! unordered pair of participant ids.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub student_id: Option<String>,
    pub body: String,
    pub created_at: i64,
    pub read: bool,
}

fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub async fn create(
    pool: &SqlitePool,
    from_id: &str,
    to_id: &str,
    text: &str,
    student_id: Option<&str>,
) -> ApiResult<Message> {
    if to_id.is_empty() {
        return Err(ApiError::validation("toUserId is required"));
    }
    let body = text.trim();
    if body.is_empty() {
        return Err(ApiError::validation("text is required"));
    }

    let id = Uuid::now_v7();
    let created_at = now_millis();

    sqlx::query(
        "INSERT INTO messages (id,from_id,to_id,student_id,body,created_at,read) VALUES (?,?,?,?,?,?,0)",
    )
    .bind(id.to_string())
    .bind(from_id)
    .bind(to_id)
    .bind(student_id)
    .bind(body)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(Message {
        id: id.to_string(),
        from_id: from_id.to_owned(),
        to_id: to_id.to_owned(),
        student_id: student_id.map(str::to_owned),
        body: body.to_owned(),
        created_at,
        read: false,
    })
}

/// Every message between the two identities, in either direction, ascending
/// by creation time. An empty history is a valid conversation.
pub async fn find_conversation(
    pool: &SqlitePool,
    a: &str,
    b: &str,
) -> ApiResult<Vec<Message>> {
    let rows: Vec<(String, String, String, Option<String>, String, i64, bool)> = sqlx::query_as(
        "SELECT id,from_id,to_id,student_id,body,created_at,read FROM messages \
         WHERE (from_id=? AND to_id=?) OR (from_id=? AND to_id=?) \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, from_id, to_id, student_id, body, created_at, read)| Message {
            id,
            from_id,
            to_id,
            student_id,
            body,
            created_at,
            read,
        })
        .collect())
}

pub async fn mark_read(pool: &SqlitePool, id: &str) -> ApiResult<Message> {
    sqlx::query("UPDATE messages SET read=1 WHERE id=?")
        .bind(id)
        .execute(pool)
        .await?;

    let row: Option<(String, String, Option<String>, String, i64, bool)> = sqlx::query_as(
        "SELECT from_id,to_id,student_id,body,created_at,read FROM messages WHERE id=?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some((from_id, to_id, student_id, body, created_at, read)) = row else {
        return Err(ApiError::not_found(format!("message {id} not found")));
    };

    Ok(Message {
        id: id.to_owned(),
        from_id,
        to_id,
        student_id,
        body,
        created_at,
        read,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn pool() -> SqlitePool {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        db::init(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn create_assigns_id_and_defaults() {
        let pool = pool().await;

        let msg = create(&pool, "p1", "t1", "Hello", None).await.unwrap();

        assert!(!msg.id.is_empty());
        assert_eq!(msg.from_id, "p1");
        assert_eq!(msg.to_id, "t1");
        assert_eq!(msg.body, "Hello");
        assert!(!msg.read);
        assert!(msg.created_at > 0);
    }

    #[tokio::test]
    async fn create_rejects_empty_text() {
        let pool = pool().await;

        let err = create(&pool, "p1", "t1", "   ", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // nothing persisted
        let msgs = find_conversation(&pool, "p1", "t1").await.unwrap();
        assert!(msgs.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_missing_recipient() {
        let pool = pool().await;

        let err = create(&pool, "p1", "", "Hello", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn conversation_is_symmetric_and_ordered() {
        let pool = pool().await;

        create(&pool, "p1", "t1", "one", None).await.unwrap();
        create(&pool, "t1", "p1", "two", None).await.unwrap();
        create(&pool, "p1", "t1", "three", None).await.unwrap();
        // a third party's thread must not leak in
        create(&pool, "p1", "t2", "other", None).await.unwrap();

        let forward = find_conversation(&pool, "p1", "t1").await.unwrap();
        let backward = find_conversation(&pool, "t1", "p1").await.unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 3);
        assert!(forward.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert!(forward.iter().all(|m| m.body != "other"));
    }

    #[tokio::test]
    async fn empty_conversation_is_not_an_error() {
        let pool = pool().await;

        let msgs = find_conversation(&pool, "p1", "nobody").await.unwrap();
        assert!(msgs.is_empty());
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let pool = pool().await;

        let msg = create(&pool, "p1", "t1", "Hello", None).await.unwrap();

        let first = mark_read(&pool, &msg.id).await.unwrap();
        let second = mark_read(&pool, &msg.id).await.unwrap();

        assert!(first.read);
        assert!(second.read);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn mark_read_unknown_id_is_not_found() {
        let pool = pool().await;

        let err = mark_read(&pool, "missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn related_student_is_kept() {
        let pool = pool().await;

        create(&pool, "p1", "t1", "About homework", Some("s1")).await.unwrap();

        let msgs = find_conversation(&pool, "t1", "p1").await.unwrap();
        assert_eq!(msgs[0].student_id.as_deref(), Some("s1"));
    }
}
