use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::AppResult, models::AnimeId};

/// Every title one user has saved (top picks plus liked watchlist entries)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedList {
    pub user_id: Uuid,
    pub anime_ids: Vec<AnimeId>,
}

/// Read access to other users' saved lists, for co-occurrence counting
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SavedListRepository: Send + Sync {
    /// Lists of every user except `exclude_user` that contain at least one of `anime_ids`
    async fn lists_containing(
        &self,
        anime_ids: &[AnimeId],
        exclude_user: Option<Uuid>,
    ) -> AppResult<Vec<SavedList>>;
}

#[derive(Debug, sqlx::FromRow)]
struct SavedListRow {
    user_id: Uuid,
    anime_ids: Vec<i64>,
}

/// Saved lists read from the `user_top_anime` and `watchlist` tables
#[derive(Clone)]
pub struct PgSavedListRepository {
    pool: PgPool,
}

impl PgSavedListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SavedListRepository for PgSavedListRepository {
    async fn lists_containing(
        &self,
        anime_ids: &[AnimeId],
        exclude_user: Option<Uuid>,
    ) -> AppResult<Vec<SavedList>> {
        let ids: Vec<i64> = anime_ids.iter().map(|id| *id as i64).collect();

        // Disliked watchlist rows are not "saved"
        let rows = sqlx::query_as::<_, SavedListRow>(
            r#"
            WITH saved AS (
                SELECT user_id, anime_id FROM user_top_anime
                UNION
                SELECT user_id, anime_id FROM watchlist WHERE is_liked
            )
            SELECT user_id, array_agg(anime_id ORDER BY anime_id) AS anime_ids
            FROM saved
            WHERE ($2::uuid IS NULL OR user_id <> $2)
            GROUP BY user_id
            HAVING bool_or(anime_id = ANY($1))
            "#,
        )
        .bind(ids)
        .bind(exclude_user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SavedList {
                user_id: row.user_id,
                anime_ids: row.anime_ids.into_iter().map(|id| id as u64).collect(),
            })
            .collect())
    }
}

/// Process-local saved lists, used by tests and database-less runs
#[derive(Default)]
pub struct InMemorySavedListRepository {
    lists: RwLock<BTreeMap<Uuid, Vec<AnimeId>>>,
}

impl InMemorySavedListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds titles to a user's saved list, ignoring ones already present
    pub async fn save(&self, user_id: Uuid, anime_ids: &[AnimeId]) {
        let mut lists = self.lists.write().await;
        let list = lists.entry(user_id).or_default();
        for id in anime_ids {
            if !list.contains(id) {
                list.push(*id);
            }
        }
    }
}

#[async_trait::async_trait]
impl SavedListRepository for InMemorySavedListRepository {
    async fn lists_containing(
        &self,
        anime_ids: &[AnimeId],
        exclude_user: Option<Uuid>,
    ) -> AppResult<Vec<SavedList>> {
        let lists = self.lists.read().await;
        Ok(lists
            .iter()
            .filter(|(user_id, _)| Some(**user_id) != exclude_user)
            .filter(|(_, saved)| saved.iter().any(|id| anime_ids.contains(id)))
            .map(|(user_id, saved)| SavedList {
                user_id: *user_id,
                anime_ids: saved.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_returns_only_lists_with_a_match() {
        let repo = InMemorySavedListRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        repo.save(alice, &[1, 2, 3]).await;
        repo.save(bob, &[4, 5]).await;

        let lists = repo.lists_containing(&[2], None).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].user_id, alice);
        assert_eq!(lists[0].anime_ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_in_memory_excludes_requesting_user() {
        let repo = InMemorySavedListRepository::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.save(me, &[1, 9]).await;
        repo.save(other, &[1, 10]).await;

        let lists = repo.lists_containing(&[1], Some(me)).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].user_id, other);
    }

    #[tokio::test]
    async fn test_in_memory_save_deduplicates() {
        let repo = InMemorySavedListRepository::new();
        let user = Uuid::new_v4();
        repo.save(user, &[1, 2]).await;
        repo.save(user, &[2, 3]).await;

        let lists = repo.lists_containing(&[3], None).await.unwrap();
        assert_eq!(lists[0].anime_ids, vec![1, 2, 3]);
    }
}
