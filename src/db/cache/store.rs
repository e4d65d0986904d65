use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use redis::Client;
use std::time::Duration;

use crate::error::{CacheError, CacheResult};

/// How long construction may spend reaching Redis before giving up
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Raw key/value storage behind [`super::Cache`]
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` is a miss; `Err` is a backend failure
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Backend name for logging
    fn backend(&self) -> &'static str;
}

/// Redis-backed store sharing one multiplexed connection across tasks
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens a connection and pings it.
    ///
    /// Accepts `redis://` / `rediss://` URLs or a bare `host:port` address. Every later
    /// command fails once `response_timeout` passes without a reply.
    pub async fn connect(addr: &str, response_timeout: Duration) -> CacheResult<Self> {
        let addr = addr.trim();
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        };

        let client = Client::open(url)?;

        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(CONNECT_TIMEOUT)
            .set_response_timeout(response_timeout)
            .set_number_of_retries(1);

        let mut conn = tokio::time::timeout(
            CONNECT_TIMEOUT,
            ConnectionManager::new_with_config(client, manager_config),
        )
        .await
        .map_err(|_| CacheError::Backend("timed out connecting to redis".to_string()))??;

        let _pong: String = tokio::time::timeout(CONNECT_TIMEOUT, redis::cmd("PING").query_async(&mut conn))
            .await
            .map_err(|_| CacheError::Backend("timed out pinging redis".to_string()))??;

        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Store used when caching is disabled or unreachable: always misses, accepts every write
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait::async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const TEST_TIMEOUT: Duration = Duration::from_millis(300);

    /// Splits complete RESP arrays off the front of `buf`, returning each command name
    fn take_commands(buf: &mut Vec<u8>) -> Vec<String> {
        let mut commands = Vec::new();
        loop {
            let Some((name, consumed)) = parse_command(buf) else {
                return commands;
            };
            buf.drain(..consumed);
            commands.push(name);
        }
    }

    fn parse_command(buf: &[u8]) -> Option<(String, usize)> {
        fn line(buf: &[u8], from: usize) -> Option<(&[u8], usize)> {
            let end = buf[from..].windows(2).position(|w| w == b"\r\n")? + from;
            Some((&buf[from..end], end + 2))
        }

        let (header, mut pos) = line(buf, 0)?;
        let argc: usize = std::str::from_utf8(header.strip_prefix(b"*")?).ok()?.parse().ok()?;
        let mut name = String::new();
        for index in 0..argc {
            let (len, next) = line(buf, pos)?;
            let len: usize = std::str::from_utf8(len.strip_prefix(b"$")?).ok()?.parse().ok()?;
            if buf.len() < next + len + 2 {
                return None;
            }
            if index == 0 {
                name = String::from_utf8_lossy(&buf[next..next + len]).to_uppercase();
            }
            pos = next + len + 2;
        }
        Some((name, pos))
    }

    /// Redis stand-in that acknowledges everything except `GET`, which it never answers
    async fn serve_stalling_redis(mut socket: TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(read) => read,
            };
            buf.extend_from_slice(&chunk[..read]);

            for command in take_commands(&mut buf) {
                let reply: &[u8] = match command.as_str() {
                    "GET" => continue,
                    "PING" => b"+PONG\r\n",
                    _ => b"+OK\r\n",
                };
                if socket.write_all(reply).await.is_err() {
                    return;
                }
            }
        }
    }

    async fn stalling_redis() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve_stalling_redis(socket));
            }
        });
        format!("redis://{}", addr)
    }

    #[tokio::test]
    async fn test_noop_always_misses() {
        let store = NoopStore;
        tokio_test::assert_ok!(
            store
                .set("providers:v1:type=movie:id=1", "{}".to_string(), Duration::from_secs(60))
                .await
        );
        assert_eq!(tokio_test::assert_ok!(store.get("providers:v1:type=movie:id=1").await), None);
        assert_eq!(tokio_test::assert_ok!(store.get("").await), None);
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = RedisStore::connect("not a url://", TEST_TIMEOUT).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connect_unreachable_fails_within_timeout() {
        let started = std::time::Instant::now();
        let result = RedisStore::connect("redis://127.0.0.1:1", TEST_TIMEOUT).await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_stalled_server_get_fails_within_response_timeout() {
        let store = RedisStore::connect(&stalling_redis().await, TEST_TIMEOUT)
            .await
            .unwrap();

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            store.get("providers:v1:type=movie:id=1"),
        )
        .await
        .expect("get must not hang on a stalled server");

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
