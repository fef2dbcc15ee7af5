//! Code Buffer
//!
//! The six single-digit cells of the verification form. Handlers never touch
//! widget focus directly: each returns an [`InputOutcome`] naming the cell the
//! host should focus once the new contents are committed.

use crate::domain::value_objects::OTP_LENGTH;

const LAST_SLOT: usize = OTP_LENGTH - 1;

/// Keys the digit cells react to. Anything else is left to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key { Backspace, ArrowLeft, ArrowRight, Enter, Other }

/// What the host must do after a handler ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// Cell to focus on the next layout pass.
    pub focus: Option<usize>,
    /// Swallow the widget's own handling of the event.
    pub suppress_default: bool,
    /// Enter was pressed on a complete buffer.
    pub submit: bool,
}

impl InputOutcome {
    fn none() -> Self { Self::default() }
    fn focus(index: usize) -> Self { Self { focus: Some(index), ..Self::default() } }
    fn suppressed(mut self) -> Self { self.suppress_default = true; self }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    slots: [Option<char>; OTP_LENGTH],
}

impl CodeBuffer {
    pub fn new() -> Self { Self::default() }

    pub fn slot(&self, index: usize) -> Option<char> { self.slots.get(index).copied().flatten() }
    pub fn slots(&self) -> &[Option<char>; OTP_LENGTH] { &self.slots }
    pub fn is_complete(&self) -> bool { self.slots.iter().all(Option::is_some) }
    pub fn is_empty(&self) -> bool { self.slots.iter().all(Option::is_none) }

    /// Concatenation of the filled cells, in order.
    pub fn code(&self) -> String { self.slots.iter().flatten().collect() }

    pub fn on_digit_change(&mut self, index: usize, raw: &str) -> InputOutcome {
        if index > LAST_SLOT { return InputOutcome::none(); }
        let digits = digits_of(raw);
        match digits.len() {
            0 => {
                self.slots[index] = None;
                InputOutcome::none()
            }
            1 => {
                self.slots[index] = Some(digits[0]);
                if index == LAST_SLOT { InputOutcome::none() } else { InputOutcome::focus(index + 1) }
            }
            n => {
                self.fill_from(index, &digits);
                InputOutcome::focus((index + n).min(LAST_SLOT))
            }
        }
    }

    pub fn on_key_down(&mut self, index: usize, key: Key) -> InputOutcome {
        if index > LAST_SLOT { return InputOutcome::none(); }
        match key {
            Key::Backspace => {
                if self.slots[index].is_some() {
                    self.slots[index] = None;
                    return InputOutcome::none();
                }
                if index == 0 { return InputOutcome::none().suppressed(); }
                self.slots[index - 1] = None;
                InputOutcome::focus(index - 1).suppressed()
            }
            Key::ArrowLeft => InputOutcome::focus(index.saturating_sub(1)).suppressed(),
            Key::ArrowRight => InputOutcome::focus((index + 1).min(LAST_SLOT)).suppressed(),
            Key::Enter => InputOutcome { submit: self.is_complete(), ..InputOutcome::none() },
            Key::Other => InputOutcome::none(),
        }
    }

    /// Clipboard text without any digit falls through to the host untouched.
    pub fn on_paste(&mut self, index: usize, text: &str) -> InputOutcome {
        if index > LAST_SLOT { return InputOutcome::none(); }
        let digits = digits_of(text);
        if digits.is_empty() { return InputOutcome::none(); }
        self.fill_from(index, &digits);
        InputOutcome::focus((index + digits.len() - 1).min(LAST_SLOT)).suppressed()
    }

    fn fill_from(&mut self, index: usize, digits: &[char]) {
        for (slot, d) in self.slots[index..].iter_mut().zip(digits) {
            *slot = Some(*d);
        }
    }
}

fn digits_of(raw: &str) -> Vec<char> { raw.chars().filter(char::is_ascii_digit).collect() }

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(code: &str) -> CodeBuffer {
        let mut buf = CodeBuffer::new();
        for (i, c) in code.chars().enumerate() { buf.on_digit_change(i, &c.to_string()); }
        buf
    }

    #[test]
    fn test_typing_advances_focus() {
        let mut buf = CodeBuffer::new();
        assert_eq!(buf.on_digit_change(0, "1").focus, Some(1));
        assert_eq!(buf.on_digit_change(5, "9").focus, None);
        assert_eq!(buf.code(), "19");
        assert!(!buf.is_complete());
        assert!(typed("123456").is_complete());
    }

    #[test]
    fn test_non_digits_are_stripped() {
        let mut buf = CodeBuffer::new();
        let out = buf.on_digit_change(2, "a");
        assert_eq!(out, InputOutcome::default());
        assert!(buf.is_empty());
        buf.on_digit_change(2, "x7");
        assert_eq!(buf.slot(2), Some('7'));
        buf.on_digit_change(2, " ");
        assert_eq!(buf.slot(2), None);
    }

    #[test]
    fn test_autofill_spreads_and_clamps() {
        let mut buf = CodeBuffer::new();
        let out = buf.on_digit_change(3, "98765");
        assert_eq!(buf.code(), "987");
        assert_eq!(buf.slot(5), Some('7'));
        assert_eq!(out.focus, Some(5));

        let mut buf = CodeBuffer::new();
        assert_eq!(buf.on_digit_change(1, "42").focus, Some(3));
    }

    #[test]
    fn test_paste_fills_from_index() {
        let mut buf = CodeBuffer::new();
        let out = buf.on_paste(0, "123456");
        assert_eq!(buf.code(), "123456");
        assert_eq!(out, InputOutcome { focus: Some(5), suppress_default: true, submit: false });

        let mut buf = CodeBuffer::new();
        let out = buf.on_paste(2, "code: 7 8");
        assert_eq!(buf.slots(), &[None, None, Some('7'), Some('8'), None, None]);
        assert_eq!(out.focus, Some(3));

        let mut buf = CodeBuffer::new();
        assert_eq!(buf.on_paste(4, "123456789").focus, Some(5));
        assert_eq!(buf.code(), "12");
    }

    #[test]
    fn test_paste_without_digits_falls_through() {
        let mut buf = typed("12");
        assert_eq!(buf.on_paste(2, "hello"), InputOutcome::default());
        assert_eq!(buf.code(), "12");
    }

    #[test]
    fn test_backspace() {
        let mut buf = typed("123");
        // filled cell clears in place
        assert_eq!(buf.on_key_down(2, Key::Backspace).focus, None);
        assert_eq!(buf.code(), "12");
        // empty cell steps back and clears the previous one
        let out = buf.on_key_down(2, Key::Backspace);
        assert_eq!(out.focus, Some(1));
        assert!(out.suppress_default);
        assert_eq!(buf.code(), "1");

        let mut empty = CodeBuffer::new();
        assert_eq!(empty.on_key_down(0, Key::Backspace).focus, None);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_arrows_clamp_and_keep_contents() {
        let mut buf = typed("12");
        assert_eq!(buf.on_key_down(0, Key::ArrowLeft).focus, Some(0));
        assert_eq!(buf.on_key_down(5, Key::ArrowRight).focus, Some(5));
        assert_eq!(buf.on_key_down(1, Key::ArrowRight).focus, Some(2));
        assert_eq!(buf.code(), "12");
    }

    #[test]
    fn test_enter_submits_only_when_complete() {
        assert!(!typed("12345").on_key_down(4, Key::Enter).submit);
        assert!(typed("123456").on_key_down(5, Key::Enter).submit);
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut buf = CodeBuffer::new();
        assert_eq!(buf.on_digit_change(6, "1"), InputOutcome::default());
        assert_eq!(buf.on_paste(9, "123"), InputOutcome::default());
        assert!(buf.is_empty());
    }
}
