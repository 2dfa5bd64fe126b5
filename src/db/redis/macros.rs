/// Read-through caching for catalog listings stored in Redis.
///
/// Looks the key up in the optional cache and returns the hit. On a miss, or
/// when Redis cannot be reached, runs the block, hands the result to the
/// background writer and returns it. Cache failures never fail the call.
///
/// # Arguments
/// * `$cache`: An `Option<Cache>`; `None` disables caching entirely.
/// * `$key`: The `CacheKey` the value is stored under.
/// * `$ttl`: Time-to-live for the cached value in seconds.
/// * `$block`: Future producing an `AppResult` of the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let top = cached!(self.cache, CacheKey::TopAnime { limit: 25 }, 3600, async move {
///     fetch_top_from_upstream().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.as_ref() {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                    None
                }
            },
            None => None,
        };

        match hit {
            Some(cached) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            None => {
                let value = $block.await?;
                if let Some(cache) = $cache.as_ref() {
                    cache.set_in_background(&key, &value, $ttl);
                }
                Ok(value)
            }
        }
    }};
}
