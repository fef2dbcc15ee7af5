//! Verification session
//!
//! Event-dispatch layer around [`VerificationFlow`]: turns UI events into
//! pure transitions, performs the backend calls and runs the cooldown
//! ticker. Dropping the session drops its ticker, which stops any countdown.

use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::aggregates::{
    InputOutcome, Key, ResendOutcome, Route, VerificationFlow, VerifyOutcome, VerifyView, RESEND_COOLDOWN_SECS,
};
use crate::domain::events::{DomainEvent, VerificationEvent};
use crate::services::auth_api::{ApiAck, ApiError, AuthApi};
use crate::services::identity::IdentityProvider;
use crate::services::ticker::{Tick, Ticker};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    DigitChange { index: usize, raw: String },
    KeyDown { index: usize, key: Key },
    Paste { index: usize, text: String },
    Submit,
    Resend,
}

/// Instructions for the host, applied after it renders the new state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Focus(usize),
    SuppressDefault,
    Navigate(Route),
}

/// What `run` publishes after every event or tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUpdate {
    pub effects: Vec<Effect>,
    pub view: VerifyView,
}

pub struct VerificationSession<A> {
    id: Uuid,
    span: tracing::Span,
    flow: VerificationFlow,
    api: A,
    ticker: Ticker,
    ticks: mpsc::UnboundedReceiver<Tick>,
}

impl<A: AuthApi> VerificationSession<A> {
    pub fn new(identity: &dyn IdentityProvider, api: A) -> Self {
        let id = Uuid::new_v4();
        let (ticker, ticks) = Ticker::new();
        let flow = VerificationFlow::new(identity.email());
        let span = tracing::info_span!("verification", session = %id, email = %flow.email());
        Self { id, span, flow, api, ticker, ticks }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn flow(&self) -> &VerificationFlow { &self.flow }
    pub fn view(&self) -> VerifyView { self.flow.view() }

    pub async fn dispatch(&mut self, event: UiEvent) -> Vec<Effect> {
        let span = self.span.clone();
        self.handle(event).instrument(span).await
    }

    async fn handle(&mut self, event: UiEvent) -> Vec<Effect> {
        let effects = match event {
            UiEvent::DigitChange { index, raw } => input_effects(self.flow.digit_change(index, &raw)),
            UiEvent::Paste { index, text } => input_effects(self.flow.paste(index, &text)),
            UiEvent::KeyDown { index, key } => {
                let outcome = self.flow.key_down(index, key);
                let mut effects = input_effects(outcome);
                if outcome.submit {
                    effects.extend(self.submit().await);
                }
                effects
            }
            UiEvent::Submit => self.submit().await,
            UiEvent::Resend => {
                self.resend().await;
                vec![]
            }
        };
        self.log_events();
        effects
    }

    async fn submit(&mut self) -> Vec<Effect> {
        let request = match self.flow.begin_submit() {
            Ok(request) => request,
            Err(rejection) => {
                tracing::debug!(%rejection, "submission rejected locally");
                return vec![];
            }
        };
        self.log_events();
        let outcome = verify_outcome(self.api.verify_code(&request).await);
        match self.flow.finish_submit(outcome) {
            Some(route) => {
                self.ticker.cancel();
                vec![Effect::Navigate(route)]
            }
            None => vec![],
        }
    }

    async fn resend(&mut self) {
        let request = match self.flow.begin_resend() {
            Ok(request) => request,
            Err(rejection) => {
                tracing::debug!(%rejection, "resend rejected locally");
                return;
            }
        };
        let outcome = resend_outcome(self.api.resend_otp(&request).await);
        if let Some(generation) = self.flow.finish_resend(outcome) {
            self.ticker.start(RESEND_COOLDOWN_SECS, generation);
        }
    }

    /// Returns whether the cooldown is still running.
    pub fn apply_tick(&mut self, tick: Tick) -> bool {
        let running = self.flow.tick(tick.generation);
        if !running {
            self.ticker.cancel();
        }
        running
    }

    /// Waits for the next ticker tick and applies it.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        let tick = self.ticks.recv().await?;
        self.apply_tick(tick);
        Some(tick)
    }

    /// Drives the session until the UI channel closes, the update receiver
    /// goes away, or the flow navigates off the page.
    pub async fn run(mut self, mut ui: mpsc::Receiver<UiEvent>, updates: mpsc::Sender<SessionUpdate>) {
        loop {
            let effects = tokio::select! {
                event = ui.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => break,
                },
                Some(tick) = self.ticks.recv() => {
                    self.apply_tick(tick);
                    vec![]
                }
            };
            let done = effects.iter().any(|e| matches!(e, Effect::Navigate(_)));
            if updates.send(SessionUpdate { effects, view: self.view() }).await.is_err() || done {
                break;
            }
        }
        tracing::debug!(parent: &self.span, "verification session ended");
    }

    fn log_events(&mut self) {
        for event in self.flow.take_events() {
            let DomainEvent::Verification(event) = event else { continue };
            match event {
                VerificationEvent::CodeSubmitted { .. } => tracing::info!("verification code submitted"),
                VerificationEvent::Verified { .. } => tracing::info!("email verified"),
                VerificationEvent::VerificationFailed { reason, .. } => tracing::warn!(%reason, "verification failed"),
                VerificationEvent::CodeResent { resend_count, .. } => tracing::info!(resend_count, "verification code resent"),
                VerificationEvent::ResendFailed { reason, .. } => tracing::warn!(%reason, "resend failed"),
            }
        }
    }
}

fn input_effects(outcome: InputOutcome) -> Vec<Effect> {
    let mut effects = Vec::new();
    if outcome.suppress_default {
        effects.push(Effect::SuppressDefault);
    }
    if let Some(index) = outcome.focus {
        effects.push(Effect::Focus(index));
    }
    effects
}

fn verify_outcome(result: Result<ApiAck, ApiError>) -> VerifyOutcome {
    match result {
        Ok(ack) if ack.success => VerifyOutcome::Verified,
        Ok(ack) => VerifyOutcome::Rejected(ack.message),
        Err(e) => {
            tracing::error!(error = %e, "verify request failed");
            VerifyOutcome::Transport
        }
    }
}

fn resend_outcome(result: Result<ApiAck, ApiError>) -> ResendOutcome {
    match result {
        Ok(ack) if ack.success => ResendOutcome::Sent,
        Ok(ack) => ResendOutcome::Rejected(ack.message),
        Err(e) => {
            tracing::error!(error = %e, "resend request failed");
            ResendOutcome::Transport
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Notice, ResendRequest, SubmissionState, VerifyRequest, MAX_RESENDS};
    use crate::domain::value_objects::Email;
    use crate::services::identity::StaticIdentity;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Reply = fn() -> Result<ApiAck, ApiError>;

    fn ok() -> Result<ApiAck, ApiError> { Ok(ApiAck { success: true, message: None }) }
    fn expired() -> Result<ApiAck, ApiError> { Ok(ApiAck { success: false, message: Some("Code expired".into()) }) }
    fn down() -> Result<ApiAck, ApiError> {
        Err(ApiError::Status { status: 502, body: "bad gateway".into() })
    }

    /// Scripted backend recording every request it receives.
    #[derive(Clone, Default)]
    struct FakeAuth {
        verify_replies: Arc<Mutex<VecDeque<Reply>>>,
        resend_replies: Arc<Mutex<VecDeque<Reply>>>,
        verified: Arc<Mutex<Vec<VerifyRequest>>>,
        resent: Arc<Mutex<Vec<ResendRequest>>>,
    }

    impl FakeAuth {
        fn verify_with(self, replies: &[Reply]) -> Self {
            self.verify_replies.lock().unwrap().extend(replies.iter().copied());
            self
        }
        fn resend_with(self, replies: &[Reply]) -> Self {
            self.resend_replies.lock().unwrap().extend(replies.iter().copied());
            self
        }
        fn verify_calls(&self) -> usize { self.verified.lock().unwrap().len() }
        fn resend_calls(&self) -> usize { self.resent.lock().unwrap().len() }
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn verify_code(&self, request: &VerifyRequest) -> Result<ApiAck, ApiError> {
            self.verified.lock().unwrap().push(request.clone());
            let reply = self.verify_replies.lock().unwrap().pop_front().unwrap_or(down);
            reply()
        }

        async fn resend_otp(&self, request: &ResendRequest) -> Result<ApiAck, ApiError> {
            self.resent.lock().unwrap().push(request.clone());
            let reply = self.resend_replies.lock().unwrap().pop_front().unwrap_or(down);
            reply()
        }
    }

    fn session(api: FakeAuth) -> VerificationSession<FakeAuth> {
        VerificationSession::new(&StaticIdentity(Email::new("ana@velore.com").unwrap()), api)
    }

    fn paste(text: &str) -> UiEvent { UiEvent::Paste { index: 0, text: text.into() } }

    #[tokio::test]
    async fn test_paste_then_verify_navigates_once() {
        let api = FakeAuth::default().verify_with(&[ok]);
        let mut s = session(api.clone());
        assert_eq!(s.dispatch(paste("123456")).await, vec![Effect::SuppressDefault, Effect::Focus(5)]);
        assert_eq!(s.dispatch(UiEvent::Submit).await, vec![Effect::Navigate(Route::Login)]);
        assert_eq!(s.flow().submission(), &SubmissionState::Succeeded);
        assert_eq!(api.verified.lock().unwrap()[0].otp.as_str(), "123456");
        assert_eq!(api.verified.lock().unwrap()[0].email.as_str(), "ana@velore.com");

        assert!(s.dispatch(UiEvent::Submit).await.is_empty());
        assert_eq!(api.verify_calls(), 1);
    }

    #[tokio::test]
    async fn test_enter_submits_complete_code() {
        let api = FakeAuth::default().verify_with(&[ok]);
        let mut s = session(api.clone());
        s.dispatch(paste("123456")).await;
        let effects = s.dispatch(UiEvent::KeyDown { index: 5, key: Key::Enter }).await;
        assert_eq!(effects, vec![Effect::Navigate(Route::Login)]);
    }

    #[tokio::test]
    async fn test_incomplete_code_never_hits_backend() {
        let api = FakeAuth::default();
        let mut s = session(api.clone());
        s.dispatch(paste("1234")).await;
        assert!(s.dispatch(UiEvent::Submit).await.is_empty());
        assert!(s.dispatch(UiEvent::KeyDown { index: 3, key: Key::Enter }).await.is_empty());
        assert_eq!(api.verify_calls(), 0);
        assert_eq!(s.view().notice, Some(Notice::Error("Please enter all 6 digits of the code.".into())));
    }

    #[tokio::test]
    async fn test_failures_keep_the_page_editable() {
        let api = FakeAuth::default().verify_with(&[expired, down]);
        let mut s = session(api.clone());
        s.dispatch(paste("123456")).await;

        s.dispatch(UiEvent::Submit).await;
        assert_eq!(s.flow().submission(), &SubmissionState::Failed("Code expired".into()));
        assert_eq!(s.flow().buffer().code(), "123456");

        s.dispatch(UiEvent::Submit).await;
        assert_eq!(s.flow().submission(), &SubmissionState::Failed("Something went wrong, please try again.".into()));
        assert!(s.view().verify_enabled);
        assert_eq!(api.verify_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_cooldown_and_cap() {
        let api = FakeAuth::default().resend_with(&[ok, ok, ok]);
        let mut s = session(api.clone());

        for round in 1..=MAX_RESENDS {
            s.dispatch(UiEvent::Resend).await;
            assert_eq!(s.flow().resend().resend_count(), round);
            assert!(!s.view().resend_enabled);
            // ignored while cooling down
            s.dispatch(UiEvent::Resend).await;
            assert_eq!(api.resend_calls() as u32, round);
            for _ in 0..RESEND_COOLDOWN_SECS {
                s.next_tick().await.unwrap();
            }
            assert_eq!(s.flow().resend().cooldown_remaining(), 0);
        }

        assert_eq!(s.view().resend_label, "Resend Disabled");
        s.dispatch(UiEvent::Resend).await;
        assert_eq!(api.resend_calls() as u32, MAX_RESENDS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_session_stops_cooldown() {
        let api = FakeAuth::default().resend_with(&[ok]);
        let mut s = session(api);
        s.dispatch(UiEvent::Resend).await;
        s.next_tick().await.unwrap();
        let task = s.ticker.abort_handle().unwrap();
        assert!(!task.is_finished());

        drop(s);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_resend_does_not_start_cooldown() {
        let api = FakeAuth::default().resend_with(&[down]);
        let mut s = session(api.clone());
        s.dispatch(UiEvent::Resend).await;
        assert_eq!(s.view().notice, Some(Notice::Error("Could not resend the code.".into())));
        assert_eq!(s.view().resend_label, "Resend Code");
        assert!(tokio::time::timeout(Duration::from_secs(5), s.next_tick()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_publishes_updates() {
        let api = FakeAuth::default().resend_with(&[ok]).verify_with(&[ok]);
        let (ui_tx, ui_rx) = mpsc::channel(8);
        let (up_tx, mut up_rx) = mpsc::channel(8);
        let runner = tokio::spawn(session(api).run(ui_rx, up_tx));

        ui_tx.send(UiEvent::Resend).await.unwrap();
        let update = up_rx.recv().await.unwrap();
        assert_eq!(update.view.resend_label, "Resend in 30s");
        let update = up_rx.recv().await.unwrap();
        assert_eq!(update.view.resend_label, "Resend in 29s");

        ui_tx.send(paste("654321")).await.unwrap();
        ui_tx.send(UiEvent::Submit).await.unwrap();
        let mut last = up_rx.recv().await.unwrap();
        while let Some(update) = up_rx.recv().await {
            last = update;
        }
        assert_eq!(last.effects, vec![Effect::Navigate(Route::Login)]);
        assert_eq!(last.view.notice, Some(Notice::Success("Verification successful!".into())));
        runner.await.unwrap();
    }
}
