//! Fake signals: commands injected by setting the root window name to
//! `fsignal:<name> [<type> <value>]`, e.g. `xsetroot -name "fsignal:setmfact f 0.6"`.
use crate::keyboard::{Arg, KeyAction};

pub const PREFIX: &str = "fsignal:";

/// A root window name read as a fake signal.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeSignal {
    /// Invoke the action called `name`.
    Invoke { name: String, arg: Arg },
    /// Recognised as a signal but unusable, so dropped.
    Ignored,
}

/// Parse a root window name. `None` means it is ordinary status text.
pub fn parse(text: &str) -> Option<FakeSignal> {
    let body = text.strip_prefix(PREFIX)?;
    let mut tokens = body.split_whitespace();

    let Some(name) = tokens.next() else {
        return Some(FakeSignal::Ignored);
    };

    let arg = match tokens.next() {
        None => Arg::None,
        Some(kind) => {
            let value = tokens.next().unwrap_or("");
            match kind {
                "i" => Arg::Int(parse_c_integer(value).unwrap_or(0) as i32),
                "ui" => Arg::UInt(parse_c_integer(value).unwrap_or(0) as u32),
                "f" => Arg::Float(value.parse().unwrap_or(0.0)),
                _ => return Some(FakeSignal::Ignored),
            }
        }
    };

    Some(FakeSignal::Invoke {
        name: name.to_string(),
        arg,
    })
}

/// The action a signal name selects. Names must match in full: `zoom` is not `zoomswap`.
pub fn matching_action(name: &str) -> Option<KeyAction> {
    KeyAction::ALL
        .into_iter()
        .find(|action| action.signal_name() == name)
}

/// Integers as C reads them with `%i`: optional sign, then hex with `0x`, octal with a
/// leading zero, or decimal.
fn parse_c_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse().ok()?
    };

    Some(if negative { -magnitude } else { magnitude })
}
