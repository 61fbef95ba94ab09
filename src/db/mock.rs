use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use futures::future::{self, BoxFuture, FutureExt};
use time::OffsetDateTime;

use crate::db::Db;
use crate::errors::BackendError;
use crate::recipe::{Recipe, RecipeFields, RecipeId, Times};

/// An in-memory stand-in for the database.
#[derive(Default)]
pub(crate) struct MockDb {
    recipes: RwLock<BTreeMap<RecipeId, Recipe>>,
    last_id: RwLock<RecipeId>,
    disconnected: AtomicBool,
    failing: AtomicBool,
}

impl MockDb {
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes `ping` fail as if the connection had been closed.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }

    /// Makes every other operation fail with an SQL error.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.recipes.read().unwrap().len()
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(BackendError::Sqlx {
                source: sqlx::Error::PoolTimedOut,
            })
        } else {
            Ok(())
        }
    }

    fn replace(&self, id: RecipeId, fields: RecipeFields) -> Result<(), BackendError> {
        self.check()?;

        let mut recipes = self.recipes.write().unwrap();
        let existing = recipes.get(&id).ok_or(BackendError::NonExistentId(id))?;
        let times = Times {
            created_at: existing.times().created_at,
            updated_at: OffsetDateTime::now_utc(),
        };

        recipes.insert(id, Recipe::new(id, fields, times));

        Ok(())
    }
}

impl Db for MockDb {
    fn ping(&self) -> BoxFuture<Result<(), BackendError>> {
        let result = if self.disconnected.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable {
                source: sqlx::Error::PoolClosed,
            })
        } else {
            Ok(())
        };

        future::ready(result).boxed()
    }

    fn retrieve(&self, id: RecipeId) -> BoxFuture<Result<Option<Recipe>, BackendError>> {
        let result = self
            .check()
            .map(|_| self.recipes.read().unwrap().get(&id).cloned());

        future::ready(result).boxed()
    }

    fn insert(&self, fields: RecipeFields) -> BoxFuture<Result<RecipeId, BackendError>> {
        let result = self.check().map(|_| {
            let mut last_id = self.last_id.write().unwrap();
            *last_id += 1;

            let now = OffsetDateTime::now_utc();
            let times = Times {
                created_at: now,
                updated_at: now,
            };

            self.recipes
                .write()
                .unwrap()
                .insert(*last_id, Recipe::new(*last_id, fields, times));

            *last_id
        });

        future::ready(result).boxed()
    }

    fn update(&self, id: RecipeId, fields: RecipeFields) -> BoxFuture<Result<(), BackendError>> {
        future::ready(self.replace(id, fields)).boxed()
    }

    fn delete(&self, id: RecipeId) -> BoxFuture<Result<(), BackendError>> {
        let result = self.check().and_then(|_| {
            self.recipes
                .write()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(BackendError::NonExistentId(id))
        });

        future::ready(result).boxed()
    }

    fn list(&self) -> BoxFuture<Result<Vec<Recipe>, BackendError>> {
        let result = self
            .check()
            .map(|_| self.recipes.read().unwrap().values().cloned().collect());

        future::ready(result).boxed()
    }
}
