//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in a one-time verification code.
pub const OTP_LENGTH: usize = 6;

/// A complete six-digit one-time code
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, OtpCodeError> {
        let value = value.as_ref();
        if value.len() != OTP_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NotSixDigits);
        }
        Ok(Self(value.to_string()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OtpCodeError { NotSixDigits }
impl std::error::Error for OtpCodeError {}
impl fmt::Display for OtpCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "OTP must be a 6-digit number.") }
}

/// Email address of the customer being verified
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, EmailError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(EmailError::Empty); }
        if !validator::validate_email(value.as_str()) { return Err(EmailError::Invalid); }
        Ok(Self(value))
    }
    /// For compile-time constants known to be valid.
    pub(crate) fn trusted(value: &str) -> Self { Self(value.to_string()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum EmailError { Empty, Invalid }
impl std::error::Error for EmailError {}
impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "Email empty"), Self::Invalid => write!(f, "Email invalid") }
    }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
    /// `rate` is a fraction, e.g. `0.08` for eight percent.
    pub fn percent(&self, rate: Decimal) -> Money { Money::new(self.amount * rate, &self.currency) }

    fn same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency == other.currency { return Ok(()); }
        Err(MoneyError::CurrencyMismatch { left: self.currency.clone(), right: other.currency.clone() })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {}", self.amount.round_dp(2), self.currency) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError { CurrencyMismatch { left: String, right: String } }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrencyMismatch { left, right } => write!(f, "Cannot combine {left} with {right}"),
        }
    }
}

/// How many of one cart line the customer takes. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Option<Self> { (value >= 1).then_some(Self(value)) }
    pub fn value(&self) -> u32 { self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_otp_code() {
        assert_eq!(OtpCode::parse("012345").unwrap().as_str(), "012345");
        assert_eq!(OtpCode::parse("12a456"), Err(OtpCodeError::NotSixDigits));
        assert_eq!(OtpCode::parse("12345"), Err(OtpCodeError::NotSixDigits));
        assert_eq!(OtpCode::parse("１２３４５６"), Err(OtpCodeError::NotSixDigits));
    }
    #[test]
    fn test_email() {
        assert_eq!(Email::new(" velore@user.com ").unwrap().as_str(), "velore@user.com");
        assert_eq!(Email::new(""), Err(EmailError::Empty));
        assert_eq!(Email::new("not-an-email"), Err(EmailError::Invalid));
    }
    #[test]
    fn test_money_arithmetic() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
        assert_eq!(a.subtract(&b).unwrap().amount(), Decimal::new(50, 0));
        assert_eq!(a.percent(Decimal::new(8, 2)).amount(), Decimal::new(8, 0));
        let err = a.subtract(&Money::zero("EUR")).unwrap_err();
        assert_eq!(err, MoneyError::CurrencyMismatch { left: "USD".into(), right: "EUR".into() });
        assert_eq!(err.to_string(), "Cannot combine USD with EUR");
    }
    #[test]
    fn test_quantity_is_at_least_one() {
        assert_eq!(Quantity::new(0), None);
        assert_eq!(Quantity::new(3).map(|q| q.value()), Some(3));
    }
}
