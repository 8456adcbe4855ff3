use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// id → display name, for attaching names to roster and public views without
/// a join per request. Approved users only; misses fall through to the DB.
pub static USER_NAME_CACHE: Lazy<Cache<u64, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn remember(user_id: u64, name: &str) {
    USER_NAME_CACHE.insert(user_id, name.to_string()).await;
}

pub async fn forget(user_id: u64) {
    USER_NAME_CACHE.invalidate(&user_id).await;
}

/// Cached name with DB read-through. None for unknown users.
pub async fn name_of(pool: &MySqlPool, user_id: u64) -> Option<String> {
    if let Some(name) = USER_NAME_CACHE.get(&user_id).await {
        return Some(name);
    }

    let name = sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .ok()
        .flatten()?;

    remember(user_id, &name).await;
    Some(name)
}

async fn batch_remember(rows: &[(u64, String)]) {
    let futures: Vec<_> = rows
        .iter()
        .map(|(id, name)| USER_NAME_CACHE.insert(*id, name.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load approved users' names into the cache at startup (batched).
pub async fn warmup_user_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String)>(
        r#"
        SELECT id, name
        FROM users
        WHERE is_approved = TRUE
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let row = row?;
        batch.push(row);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_remember(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_remember(&batch).await;
    }

    log::info!("User name cache warmup complete: {} users", total_count);

    Ok(())
}
