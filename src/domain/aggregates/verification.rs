//! Verification Aggregate
//!
//! State of the email verification page: the code cells, the submission
//! lifecycle and the resend policy. Every transition is synchronous; network
//! calls happen between a `begin_*` and the matching `finish_*`.

use chrono::Utc;
use serde::Serialize;
use std::fmt;

use super::code_buffer::{CodeBuffer, InputOutcome, Key};
use super::resend::ResendState;
use crate::domain::events::{DomainEvent, VerificationEvent};
use crate::domain::value_objects::{Email, OtpCode, OTP_LENGTH};

pub const MSG_INCOMPLETE: &str = "Please enter all 6 digits of the code.";
pub const MSG_MALFORMED: &str = "OTP must be a 6-digit number.";
pub const MSG_VERIFIED: &str = "Verification successful!";
pub const MSG_INVALID_CODE: &str = "Invalid code, please try again.";
pub const MSG_VERIFY_TRANSPORT: &str = "Something went wrong, please try again.";
pub const MSG_RESENT: &str = "A new code has been sent.";
pub const MSG_RESEND_FAILED: &str = "Failed to resend code.";
pub const MSG_RESEND_TRANSPORT: &str = "Could not resend the code.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Failed(String),
    Succeeded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice { Error(String), Success(String) }

/// Where the host should go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route { Login }

impl Route {
    pub fn path(&self) -> &'static str {
        match self { Self::Login => "/login" }
    }
}

/// Body of `POST /api/auth/verify-code`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifyRequest { pub otp: OtpCode, pub email: Email }

/// Body of `POST /api/auth/resend-otp`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResendRequest { pub email: Email }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome { Verified, Rejected(Option<String>), Transport }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResendOutcome { Sent, Rejected(Option<String>), Transport }

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SubmitRejection { InFlight, AlreadyVerified, Incomplete, Malformed }
impl std::error::Error for SubmitRejection {}
impl fmt::Display for SubmitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InFlight => write!(f, "Verification already in progress"),
            Self::AlreadyVerified => write!(f, "Already verified"),
            Self::Incomplete => write!(f, "{}", MSG_INCOMPLETE),
            Self::Malformed => write!(f, "{}", MSG_MALFORMED),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ResendRejection { InFlight, CoolingDown, Exhausted }
impl std::error::Error for ResendRejection {}
impl fmt::Display for ResendRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InFlight => write!(f, "Resend already in progress"),
            Self::CoolingDown => write!(f, "Resend cooling down"),
            Self::Exhausted => write!(f, "Resend limit reached"),
        }
    }
}

/// Snapshot the host renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyView {
    pub email: String,
    pub slots: [Option<char>; OTP_LENGTH],
    pub focus: usize,
    pub notice: Option<Notice>,
    pub verify_label: &'static str,
    pub verify_enabled: bool,
    pub resend_label: String,
    pub resend_enabled: bool,
}

#[derive(Clone, Debug)]
pub struct VerificationFlow {
    email: Email,
    buffer: CodeBuffer,
    focus: usize,
    submission: SubmissionState,
    resend: ResendState,
    resend_in_flight: bool,
    notice: Option<Notice>,
    events: Vec<DomainEvent>,
}

impl VerificationFlow {
    pub fn new(email: Email) -> Self {
        Self {
            email, buffer: CodeBuffer::new(), focus: 0, submission: SubmissionState::Idle,
            resend: ResendState::new(), resend_in_flight: false, notice: None, events: vec![],
        }
    }

    pub fn email(&self) -> &Email { &self.email }
    pub fn buffer(&self) -> &CodeBuffer { &self.buffer }
    pub fn focus(&self) -> usize { self.focus }
    pub fn submission(&self) -> &SubmissionState { &self.submission }
    pub fn resend(&self) -> &ResendState { &self.resend }
    pub fn notice(&self) -> Option<&Notice> { self.notice.as_ref() }
    pub fn is_submitting(&self) -> bool { self.submission == SubmissionState::Submitting }
    pub fn can_submit(&self) -> bool { !self.is_submitting() && self.buffer.is_complete() }
    pub fn can_resend(&self) -> bool { !self.resend_in_flight && self.resend.can_resend() }

    pub fn digit_change(&mut self, index: usize, raw: &str) -> InputOutcome {
        let outcome = self.buffer.on_digit_change(index, raw);
        self.track(outcome)
    }

    pub fn key_down(&mut self, index: usize, key: Key) -> InputOutcome {
        let outcome = self.buffer.on_key_down(index, key);
        self.track(outcome)
    }

    pub fn paste(&mut self, index: usize, text: &str) -> InputOutcome {
        let outcome = self.buffer.on_paste(index, text);
        self.track(outcome)
    }

    fn track(&mut self, outcome: InputOutcome) -> InputOutcome {
        if let Some(i) = outcome.focus { self.focus = i; }
        outcome
    }

    /// Validates the code locally and moves to `Submitting`. Local failures
    /// never leave the page: they set an inline error, keep the buffer and
    /// return the submission to `Idle` so it never disagrees with the notice.
    pub fn begin_submit(&mut self) -> Result<VerifyRequest, SubmitRejection> {
        match self.submission {
            SubmissionState::Submitting => return Err(SubmitRejection::InFlight),
            SubmissionState::Succeeded => return Err(SubmitRejection::AlreadyVerified),
            SubmissionState::Idle | SubmissionState::Failed(_) => {}
        }
        self.notice = None;
        if !self.buffer.is_complete() {
            self.reject_locally(MSG_INCOMPLETE);
            return Err(SubmitRejection::Incomplete);
        }
        let otp = match OtpCode::parse(self.buffer.code()) {
            Ok(otp) => otp,
            Err(_) => {
                self.reject_locally(MSG_MALFORMED);
                return Err(SubmitRejection::Malformed);
            }
        };
        self.submission = SubmissionState::Submitting;
        self.raise_event(VerificationEvent::CodeSubmitted { email: self.email.clone(), at: Utc::now() });
        Ok(VerifyRequest { otp, email: self.email.clone() })
    }

    fn reject_locally(&mut self, message: &str) {
        self.submission = SubmissionState::Idle;
        self.notice = Some(Notice::Error(message.to_string()));
    }

    /// Applies the backend's answer. Returns the route to navigate to, at
    /// most once per flow.
    pub fn finish_submit(&mut self, outcome: VerifyOutcome) -> Option<Route> {
        if !self.is_submitting() { return None; }
        match outcome {
            VerifyOutcome::Verified => {
                self.submission = SubmissionState::Succeeded;
                self.notice = Some(Notice::Success(MSG_VERIFIED.to_string()));
                self.resend.cancel_cooldown();
                self.raise_event(VerificationEvent::Verified { email: self.email.clone(), at: Utc::now() });
                Some(Route::Login)
            }
            VerifyOutcome::Rejected(message) => {
                let message = message.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| MSG_INVALID_CODE.to_string());
                self.fail_submit(message);
                None
            }
            VerifyOutcome::Transport => {
                self.fail_submit(MSG_VERIFY_TRANSPORT.to_string());
                None
            }
        }
    }

    fn fail_submit(&mut self, message: String) {
        self.submission = SubmissionState::Failed(message.clone());
        self.notice = Some(Notice::Error(message.clone()));
        self.raise_event(VerificationEvent::VerificationFailed { email: self.email.clone(), reason: message, at: Utc::now() });
    }

    pub fn begin_resend(&mut self) -> Result<ResendRequest, ResendRejection> {
        if self.resend_in_flight { return Err(ResendRejection::InFlight); }
        if self.resend.is_exhausted() { return Err(ResendRejection::Exhausted); }
        if !self.resend.can_resend() { return Err(ResendRejection::CoolingDown); }
        self.notice = None;
        self.resend_in_flight = true;
        Ok(ResendRequest { email: self.email.clone() })
    }

    /// Returns the countdown generation to start the ticker with when the
    /// resend went through.
    pub fn finish_resend(&mut self, outcome: ResendOutcome) -> Option<u64> {
        if !self.resend_in_flight { return None; }
        self.resend_in_flight = false;
        let message = match outcome {
            ResendOutcome::Sent => {
                let generation = self.resend.record_success();
                self.notice = Some(Notice::Success(MSG_RESENT.to_string()));
                self.raise_event(VerificationEvent::CodeResent {
                    email: self.email.clone(), resend_count: self.resend.resend_count(), at: Utc::now(),
                });
                return Some(generation);
            }
            ResendOutcome::Rejected(message) => message.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| MSG_RESEND_FAILED.to_string()),
            ResendOutcome::Transport => MSG_RESEND_TRANSPORT.to_string(),
        };
        self.notice = Some(Notice::Error(message.clone()));
        self.raise_event(VerificationEvent::ResendFailed { email: self.email.clone(), reason: message, at: Utc::now() });
        None
    }

    /// Returns whether the cooldown is still running.
    pub fn tick(&mut self, generation: u64) -> bool { self.resend.tick(generation) }

    pub fn view(&self) -> VerifyView {
        VerifyView {
            email: self.email.to_string(),
            slots: *self.buffer.slots(),
            focus: self.focus,
            notice: self.notice.clone(),
            verify_label: if self.is_submitting() { "Verifying..." } else { "Verify" },
            verify_enabled: self.can_submit(),
            resend_label: self.resend.label(),
            resend_enabled: self.can_resend(),
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: VerificationEvent) { self.events.push(DomainEvent::Verification(e)); }
}
