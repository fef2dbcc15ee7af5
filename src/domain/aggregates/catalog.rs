//! Catalog browsing
//!
//! Shop page filtering and sorting over an in-memory product list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

pub const ALL_CATEGORIES: &[&str] = &["hoodies", "shirts", "pants", "sweaters", "joggers", "jackets"];
pub const MALE_CATEGORIES: &[&str] = &["hoodies", "shirts", "pants", "jackets"];
pub const FEMALE_CATEGORIES: &[&str] = &["sweaters", "blazers", "joggers"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender { Male, Female }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: Money,
    pub original_price: Option<Money>,
    pub category: String,
    pub color: String,
    pub sizes: Vec<String>,
    pub is_new: bool,
    pub gender: Gender,
}

impl Product {
    pub fn is_sale(&self) -> bool { self.original_price.is_some() }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenderFilter { #[default] All, Only(Gender) }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder { #[default] Featured, PriceLowToHigh, PriceHighToLow, Newest }

/// `None` for category or color means "all".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopFilter {
    pub gender: GenderFilter,
    pub category: Option<String>,
    pub color: Option<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

impl Default for ShopFilter {
    fn default() -> Self {
        Self { gender: GenderFilter::All, category: None, color: None, min_price: Decimal::ZERO, max_price: Decimal::new(10_000, 0) }
    }
}

impl ShopFilter {
    pub fn matches(&self, p: &Product) -> bool {
        if let GenderFilter::Only(g) = self.gender {
            if p.gender != g { return false; }
        }
        if self.category.as_ref().is_some_and(|c| *c != p.category) { return false; }
        if self.color.as_ref().is_some_and(|c| *c != p.color) { return false; }
        let price = p.price.amount();
        price >= self.min_price && price <= self.max_price
    }
}

/// Categories offered in the filter sidebar for the selected gender.
pub fn available_categories(gender: GenderFilter) -> &'static [&'static str] {
    match gender {
        GenderFilter::All => ALL_CATEGORIES,
        GenderFilter::Only(Gender::Male) => MALE_CATEGORIES,
        GenderFilter::Only(Gender::Female) => FEMALE_CATEGORIES,
    }
}

pub fn browse<'a>(products: &'a [Product], filter: &ShopFilter, sort: SortOrder) -> Vec<&'a Product> {
    let mut found: Vec<&Product> = products.iter().filter(|p| filter.matches(p)).collect();
    match sort {
        SortOrder::Featured => {}
        SortOrder::PriceLowToHigh => found.sort_by(|a, b| a.price.amount().cmp(&b.price.amount())),
        SortOrder::PriceHighToLow => found.sort_by(|a, b| b.price.amount().cmp(&a.price.amount())),
        SortOrder::Newest => found.sort_by_key(|p| !p.is_new),
    }
    found
}
