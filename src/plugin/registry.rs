use std::collections::HashMap;

use sea_orm::Value;

use crate::database::{Connection, DatabaseError, DatabasePool, Driver, ResultSet};

/// Pools registered on a host
///
/// Stored on the [`PluginHost`](super::PluginHost) under
/// [`DECORATION`](super::DECORATION). The root pool is the first pool
/// registered; every named registration, the root's included, is also
/// reachable through [`named`](Self::named). Cheap to clone, so it can be handed to actix-web
/// as `web::Data<PoolRegistry>`.
#[derive(Clone, Debug)]
pub struct PoolRegistry {
    db: Driver,
    root: DatabasePool,
    /// Name the root pool was registered under, if any
    root_name: Option<String>,
    named: HashMap<String, DatabasePool>,
}

impl PoolRegistry {
    /// Registry whose root is `root`, also stored under `name` when given
    pub(crate) fn new(db: Driver, root: DatabasePool, name: Option<&str>) -> Self {
        let mut named = HashMap::new();
        if let Some(name) = name {
            named.insert(name.to_string(), root.clone());
        }

        Self {
            db,
            root,
            root_name: name.map(str::to_string),
            named,
        }
    }

    /// The driver handle the pools were created with
    pub fn db(&self) -> &Driver {
        &self.db
    }

    /// The root pool
    pub fn pool(&self) -> &DatabasePool {
        &self.root
    }

    /// Check a connection out of the root pool
    pub async fn get_connection(&self) -> Result<Connection, DatabaseError> {
        self.root.get_connection().await
    }

    /// Run one statement on the root pool
    pub async fn query<I>(&self, sql: &str, values: I) -> Result<ResultSet, DatabaseError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.root.query(sql, values).await
    }

    pub fn named(&self, name: &str) -> Option<&DatabasePool> {
        self.named.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every registered pool once: the root first, then the other named
    /// pools in name order
    ///
    /// A root registered under a name is reported with that name.
    pub fn pools(&self) -> impl Iterator<Item = (Option<&str>, &DatabasePool)> {
        let root_name = self.root_name.as_deref();

        std::iter::once((root_name, &self.root)).chain(
            self.names()
                .into_iter()
                .filter(move |name| Some(*name) != root_name)
                .filter_map(move |name| self.named.get(name).map(|pool| (Some(name), pool))),
        )
    }

    /// Insert `pool` under `name`; returns `false` and keeps the existing
    /// pool when the name is taken
    pub(crate) fn insert(&mut self, name: &str, pool: DatabasePool) -> bool {
        if self.named.contains_key(name) {
            return false;
        }
        self.named.insert(name.to_string(), pool);
        true
    }
}
