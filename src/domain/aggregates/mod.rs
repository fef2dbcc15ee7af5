//! Aggregates module
pub mod code_buffer;
pub mod countdown;
pub mod resend;
pub mod verification;
pub mod cart;
pub mod catalog;

pub use code_buffer::{CodeBuffer, InputOutcome, Key};
pub use countdown::Countdown;
pub use resend::{ResendState, MAX_RESENDS, RESEND_COOLDOWN_SECS};
pub use verification::{
    Notice, ResendOutcome, ResendRejection, ResendRequest, Route, SubmissionState, SubmitRejection,
    VerificationFlow, VerifyOutcome, VerifyRequest, VerifyView,
};
pub use cart::{Cart, CartError, CartItem, CartSummary};
pub use catalog::{Gender, GenderFilter, Product, ShopFilter, SortOrder};
