//! Defines the subcategory store trait.

use crate::{
    Error,
    models::{DatabaseID, NewSubCategory, SubCategory, UserID},
};

/// Handles the persistence of expense subcategories.
pub trait SubCategoryStore {
    /// Create a new subcategory in the store and assign it an ID.
    fn create(&mut self, new_sub_category: NewSubCategory) -> Result<SubCategory, Error>;

    /// Retrieve a subcategory by its `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no subcategory with that ID exists.
    fn get(&self, id: DatabaseID) -> Result<SubCategory, Error>;

    /// Retrieve all of a user's subcategories.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<SubCategory>, Error>;
}
