use serde::Serialize;

use crate::recipe::Recipe;

pub const PONG: &str = "pong";
pub const RETRIEVED: &str = "Recipe details by id";
pub const CREATED: &str = "Recipe successfully created!";
pub const UPDATED: &str = "Recipe successfully updated!";
pub const DELETED: &str = "Recipe successfully removed!";
pub const CREATION_FAILED: &str = "Recipe creation failed!";
pub const UPDATE_FAILED: &str = "Recipe update failed!";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    List {
        recipes: Vec<Recipe>,
    },
    Recipe {
        message: &'a str,
        // always a single element
        recipe: Vec<Recipe>,
    },
    Message {
        message: &'a str,
    },
}

impl<'a> SuccessResponse<'a> {
    pub fn recipe(message: &'a str, recipe: Recipe) -> Self {
        SuccessResponse::Recipe {
            message,
            recipe: vec![recipe],
        }
    }
}
