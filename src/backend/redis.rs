//! Redis Backend
//!
//! [`KvBackend`] over a Redis multiplexed connection.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::{debug, info};

use super::{Connector, KvBackend};
use crate::config::ConnectionParams;
use crate::error::BackendResult;

// == Connector ==
/// Opens [`RedisBackend`] connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl RedisConnector {
    fn client(params: &ConnectionParams) -> BackendResult<Client> {
        let client = match &params.url {
            Some(url) => Client::open(url.as_str())?,
            None => Client::open(ConnectionInfo {
                addr: ConnectionAddr::Tcp(params.host().to_string(), params.port()),
                redis: RedisConnectionInfo {
                    db: params.db,
                    username: params.username.clone(),
                    password: params.password.clone(),
                    ..RedisConnectionInfo::default()
                },
            })?,
        };
        Ok(client)
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self, params: &ConnectionParams) -> BackendResult<Box<dyn KvBackend>> {
        let client = Self::client(params)?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!(
            "Connected to redis at {}:{} (db {})",
            params.host(),
            params.port(),
            params.db
        );
        Ok(Box::new(RedisBackend { connection }))
    }
}

// == Redis Backend ==
/// Backend over one multiplexed connection.
///
/// The connection is cloned per call; clones share the same socket.
#[derive(Clone)]
pub struct RedisBackend {
    connection: MultiplexedConnection,
}

impl RedisBackend {
    pub fn new(connection: MultiplexedConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        let mut con = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut con)
            .await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> BackendResult<()> {
        let mut con = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .query_async(&mut con)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut con = self.connection.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut con).await?;
        Ok(value)
    }

    async fn expire(&self, key: &str, seconds: u64) -> BackendResult<bool> {
        let mut con = self.connection.clone();
        let applied: bool = redis::cmd("EXPIRE")
            .arg(key)
            .arg(seconds)
            .query_async(&mut con)
            .await?;
        Ok(applied)
    }

    async fn hset_all(&self, key: &str, fields: &[(String, String)]) -> BackendResult<()> {
        let mut con = self.connection.clone();
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }
        let _: () = cmd.query_async(&mut con).await?;
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> BackendResult<HashMap<String, String>> {
        let mut con = self.connection.clone();
        let fields: HashMap<String, String> =
            redis::cmd("HGETALL").arg(key).query_async(&mut con).await?;
        Ok(fields)
    }

    async fn del(&self, key: &str) -> BackendResult<u64> {
        let mut con = self.connection.clone();
        let removed: u64 = redis::cmd("DEL").arg(key).query_async(&mut con).await?;
        Ok(removed)
    }

    async fn quit(&self) -> BackendResult<()> {
        let mut con = self.connection.clone();
        let _: () = redis::cmd("QUIT").query_async(&mut con).await?;
        debug!("Sent QUIT to redis");
        Ok(())
    }
}
