//! Domain events
use chrono::{DateTime, Utc};
use crate::domain::value_objects::Email;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Verification(VerificationEvent),
    Cart(CartEvent),
}

#[derive(Clone, Debug)]
pub enum VerificationEvent {
    CodeSubmitted { email: Email, at: DateTime<Utc> },
    Verified { email: Email, at: DateTime<Utc> },
    VerificationFailed { email: Email, reason: String, at: DateTime<Utc> },
    CodeResent { email: Email, resend_count: u32, at: DateTime<Utc> },
    ResendFailed { email: Email, reason: String, at: DateTime<Utc> },
}

#[derive(Clone, Debug)]
pub enum CartEvent {
    QuantityChanged { cart_id: String, item_id: String, quantity: u32 },
    ItemRemoved { cart_id: String, item_id: String },
    PromoApplied { cart_id: String, code: String },
    PromoRemoved { cart_id: String },
}
