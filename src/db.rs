use futures::future::BoxFuture;

use crate::errors::BackendError;
use crate::recipe::{Recipe, RecipeFields, RecipeId};

#[cfg(test)]
pub(crate) mod mock;

/// The persistence operations the handlers depend on.
pub trait Db {
    /// Checks that the database can be reached. Fails with
    /// `BackendError::Unavailable`.
    fn ping(&self) -> BoxFuture<Result<(), BackendError>>;

    /// Returns the recipe with the given ID, or `None` if there isn’t
    /// one.
    fn retrieve(&self, id: RecipeId) -> BoxFuture<Result<Option<Recipe>, BackendError>>;

    /// Inserts a new recipe and returns the ID assigned to it.
    fn insert(&self, fields: RecipeFields) -> BoxFuture<Result<RecipeId, BackendError>>;

    /// Replaces every field of the recipe with the given ID. Fails with
    /// `BackendError::NonExistentId` unless exactly one row changes.
    fn update(&self, id: RecipeId, fields: RecipeFields) -> BoxFuture<Result<(), BackendError>>;

    /// Deletes the recipe with the given ID. Fails with
    /// `BackendError::NonExistentId` unless exactly one row is removed.
    fn delete(&self, id: RecipeId) -> BoxFuture<Result<(), BackendError>>;

    /// Returns every recipe, ordered by ID.
    fn list(&self) -> BoxFuture<Result<Vec<Recipe>, BackendError>>;
}

pub use self::mysql::*;

mod mysql {
    use std::convert::TryFrom;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        mysql::{MySql, MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlRow},
        Connection,
    };

    use crate::errors::BackendError;
    use crate::recipe::{Recipe, RecipeFields, RecipeId, Times};

    pub struct MySqlDb {
        pool: MySqlPool,
        options: MySqlConnectOptions,
    }

    impl MySqlDb {
        /// `options` must be the ones `pool` connects with. They are used
        /// to report why a connection can't be made.
        pub fn new(pool: MySqlPool, options: MySqlConnectOptions) -> Self {
            MySqlDb { pool, options }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for MySqlDb {
        fn ping(&self) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let mut connection = match self.pool.acquire().await {
                    Ok(connection) => connection,
                    // the pool retries refused connections until it times
                    // out, hiding the cause
                    Err(sqlx::Error::PoolTimedOut) => {
                        let source = match MySqlConnection::connect_with(&self.options).await {
                            Ok(connection) => {
                                connection.close().await.ok();
                                sqlx::Error::PoolTimedOut
                            }
                            Err(e) => e,
                        };

                        return Err(BackendError::Unavailable { source });
                    }
                    Err(source) => return Err(BackendError::Unavailable { source }),
                };

                connection
                    .ping()
                    .await
                    .map_err(|source| BackendError::Unavailable { source })?;

                Ok(())
            }
            .boxed()
        }

        fn retrieve(&self, id: RecipeId) -> BoxFuture<Result<Option<Recipe>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/retrieve.sql"));

                let recipe: Option<Recipe> = query
                    .bind(id)
                    .try_map(recipe_from_row)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(recipe)
            }
            .boxed()
        }

        fn insert(&self, fields: RecipeFields) -> BoxFuture<Result<RecipeId, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/create.sql"));

                let id = query
                    .bind(&fields.title)
                    .bind(&fields.preparation_time)
                    .bind(&fields.serves)
                    .bind(&fields.ingredients)
                    .bind(fields.cost)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .last_insert_id();

                RecipeId::try_from(id).map_err(|_| BackendError::IdOutOfRange(id))
            }
            .boxed()
        }

        fn update(
            &self,
            id: RecipeId,
            fields: RecipeFields,
        ) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/update.sql"));

                let count = query
                    .bind(&fields.title)
                    .bind(&fields.preparation_time)
                    .bind(&fields.serves)
                    .bind(&fields.ingredients)
                    .bind(fields.cost)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                expect_single_row(id, count)
            }
            .boxed()
        }

        fn delete(&self, id: RecipeId) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/delete.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                expect_single_row(id, count)
            }
            .boxed()
        }

        fn list(&self) -> BoxFuture<Result<Vec<Recipe>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/list.sql"));

                let recipes: Vec<Recipe> = query
                    .try_map(recipe_from_row)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(recipes)
            }
            .boxed()
        }
    }

    fn expect_single_row(id: RecipeId, count: u64) -> Result<(), BackendError> {
        if count == 1 {
            Ok(())
        } else {
            Err(BackendError::NonExistentId(id))
        }
    }

    fn recipe_from_row(row: MySqlRow) -> Result<Recipe, sqlx::Error> {
        let fields = RecipeFields {
            title: try_get(&row, "title")?,
            preparation_time: try_get(&row, "making_time")?,
            serves: try_get(&row, "serves")?,
            ingredients: try_get(&row, "ingredients")?,
            cost: try_get(&row, "cost")?,
        };

        let times = Times {
            created_at: try_get(&row, "created_at")?,
            updated_at: try_get(&row, "updated_at")?,
        };

        Ok(Recipe::new(try_get(&row, "id")?, fields, times))
    }

    fn try_get<'a, T: sqlx::Type<MySql> + sqlx::decode::Decode<'a, MySql>>(
        row: &'a MySqlRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(source: sqlx::Error) -> BackendError {
        BackendError::Sqlx { source }
    }

}
