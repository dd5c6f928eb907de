//! Expense categorization: a fixed set of top-level categories and the
//! user-defined subcategories that expenses point at.

use serde::{Deserialize, Serialize};

use crate::models::{DatabaseID, UserID};

/// The fixed set of top-level expense categories.
///
/// Users cannot define their own top-level categories; they define
/// [subcategories](SubCategory) that sit under one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    /// Recurring paid services, e.g. streaming or a gym membership.
    Subscription,
    /// Groceries and eating out.
    Food,
    /// Power, water, internet and similar bills.
    Utilities,
    /// Cinema, games, hobbies.
    Entertainment,
    /// Fuel, public transport, vehicle upkeep.
    Transportation,
    /// Medical costs and insurance.
    Healthcare,
    /// Everything that does not fit the categories above.
    Other,
}

impl ExpenseCategory {
    /// Parse the stable storage code, e.g. `"FOOD"`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SUBSCRIPTION" => Some(Self::Subscription),
            "FOOD" => Some(Self::Food),
            "UTILITIES" => Some(Self::Utilities),
            "ENTERTAINMENT" => Some(Self::Entertainment),
            "TRANSPORTATION" => Some(Self::Transportation),
            "HEALTHCARE" => Some(Self::Healthcare),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    /// The stable code used in the database.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Subscription => "SUBSCRIPTION",
            Self::Food => "FOOD",
            Self::Utilities => "UTILITIES",
            Self::Entertainment => "ENTERTAINMENT",
            Self::Transportation => "TRANSPORTATION",
            Self::Healthcare => "HEALTHCARE",
            Self::Other => "OTHER",
        }
    }

    /// The name shown to users and used as the grouping key in the category
    /// breakdown.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Subscription => "Subscription",
            Self::Food => "Food",
            Self::Utilities => "Utilities",
            Self::Entertainment => "Entertainment",
            Self::Transportation => "Transportation",
            Self::Healthcare => "Healthcare",
            Self::Other => "Other",
        }
    }
}

/// A user-defined grouping for expenses that sits under one of the fixed
/// top-level categories, e.g. "Streaming" under [ExpenseCategory::Subscription].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    id: DatabaseID,
    user_id: UserID,
    category: ExpenseCategory,
    name: String,
}

impl SubCategory {
    /// Create a subcategory from its parts.
    ///
    /// This function does not persist anything, see
    /// [SubCategoryStore](crate::stores::SubCategoryStore) for that.
    pub fn new(id: DatabaseID, user_id: UserID, category: ExpenseCategory, name: String) -> Self {
        Self {
            id,
            user_id,
            category,
            name,
        }
    }

    /// The ID of the subcategory.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that created this subcategory.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The top-level category this subcategory belongs to.
    pub fn category(&self) -> ExpenseCategory {
        self.category
    }

    /// The user-chosen name of the subcategory.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The data for a subcategory that has not been persisted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSubCategory {
    /// The user the subcategory belongs to.
    pub user_id: UserID,
    /// The top-level category it sits under.
    pub category: ExpenseCategory,
    /// The user-chosen name.
    pub name: String,
}
