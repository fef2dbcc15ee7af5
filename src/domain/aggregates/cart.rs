//! Cart Aggregate

use rust_decimal::Decimal;
use uuid::Uuid;
use crate::domain::value_objects::{Money, Quantity};
use crate::domain::events::{CartEvent, DomainEvent};

pub const PROMO_CODE: &str = "VELORE10";
const FREE_SHIPPING_OVER: Decimal = Decimal::from_parts(200, 0, 0, false, 0);
const FLAT_SHIPPING: Decimal = Decimal::from_parts(25, 0, 0, false, 0);
const PROMO_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    items: Vec<CartItem>,
    promo: Option<String>,
    currency: String,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub size: String,
    pub color: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub original_price: Option<Money>,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity.value()) }
    pub fn is_sale(&self) -> bool { self.original_price.is_some() }

    /// What the customer saves on this line against the original price.
    pub fn line_savings(&self) -> Money {
        match &self.original_price {
            Some(original) => original
                .subtract(&self.unit_price)
                .map(|d| d.multiply(self.quantity.value()))
                .unwrap_or_else(|_| Money::zero(self.unit_price.currency())),
            None => Money::zero(self.unit_price.currency()),
        }
    }
}

/// Derived totals shown in the order summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartSummary {
    pub item_count: usize,
    pub subtotal: Money,
    pub savings: Money,
    pub promo_discount: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { id: Uuid::new_v4().to_string(), items: vec![], promo: None, currency: currency.to_string(), events: vec![] }
    }

    pub fn with_items(currency: &str, items: Vec<CartItem>) -> Self {
        let mut cart = Self::new(currency);
        cart.items = items;
        cart
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn applied_promo(&self) -> Option<&str> { self.promo.as_deref() }

    /// Quantities below one are refused; use `remove_item` instead.
    pub fn update_quantity(&mut self, item_id: &str, quantity: u32) -> Result<(), CartError> {
        let new_quantity = Quantity::new(quantity).ok_or(CartError::InvalidQuantity)?;
        let item = self.items.iter_mut().find(|i| i.id == item_id).ok_or(CartError::ItemNotFound)?;
        item.quantity = new_quantity;
        self.raise_event(CartEvent::QuantityChanged { cart_id: self.id.clone(), item_id: item_id.to_string(), quantity });
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.raise_event(CartEvent::ItemRemoved { cart_id: self.id.clone(), item_id: item_id.to_string() });
        Ok(())
    }

    pub fn apply_promo(&mut self, code: &str) -> Result<(), CartError> {
        if !code.trim().eq_ignore_ascii_case(PROMO_CODE) { return Err(CartError::UnknownPromo); }
        self.promo = Some(PROMO_CODE.to_string());
        self.raise_event(CartEvent::PromoApplied { cart_id: self.id.clone(), code: PROMO_CODE.to_string() });
        Ok(())
    }

    /// Drops the applied promo, if any. Removing when none is applied is a no-op.
    pub fn remove_promo(&mut self) {
        if self.promo.take().is_some() {
            self.raise_event(CartEvent::PromoRemoved { cart_id: self.id.clone() });
        }
    }

    pub fn summary(&self) -> CartSummary {
        let zero = Money::zero(&self.currency);
        let subtotal = self.items.iter().fold(zero.clone(), |acc, i| acc.add(&i.line_total()).unwrap_or(acc));
        let savings = self.items.iter().fold(zero.clone(), |acc, i| acc.add(&i.line_savings()).unwrap_or(acc));
        let promo_discount = if self.promo.is_some() { subtotal.percent(PROMO_RATE) } else { zero };
        let shipping = if subtotal.amount() > FREE_SHIPPING_OVER {
            Money::zero(&self.currency)
        } else {
            Money::new(FLAT_SHIPPING, &self.currency)
        };
        let discounted = subtotal.subtract(&promo_discount).unwrap_or(subtotal.clone());
        let tax = discounted.percent(TAX_RATE);
        let total = discounted.add(&shipping).and_then(|t| t.add(&tax)).unwrap_or(discounted.clone());
        CartSummary { item_count: self.items.len(), subtotal, savings, promo_discount, shipping, tax, total }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound, InvalidQuantity, UnknownPromo }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound => write!(f, "Item not found"),
            Self::InvalidQuantity => write!(f, "Quantity must be at least 1"),
            Self::UnknownPromo => write!(f, "Unknown promo code"),
        }
    }
}
