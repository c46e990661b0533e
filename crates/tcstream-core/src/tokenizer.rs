//! Argument tokenizer for service-message payloads and runner command lines.
//!
//! Both inputs share the same shape: whitespace separated tokens with shell
//! quoting, where options are `--key=value`, `--key value` or bare `--flag`.
//! Service-message payloads additionally use `key='value'` pairs after the
//! command name. Values are never coerced; everything stays a string.

use crate::escape::{escape_single_quote, unescape, unescape_single_quote};

/// Value attached to a parsed option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Option given without a value (`--teamcity`).
    Flag,
    /// Option with a value (`--filter=foo`, `--filter foo`, `name='foo'`).
    Value(String),
}

impl ArgValue {
    /// Value as a string, with bare flags reading as `"true"`.
    pub fn as_str(&self) -> &str {
        match self {
            ArgValue::Flag => "true",
            ArgValue::Value(v) => v,
        }
    }
}

/// Options and positional tokens in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSet {
    pub options: Vec<(String, ArgValue)>,
    pub positional: Vec<String>,
}

impl ArgumentSet {
    /// Last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.options
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn has(&self, key: &str) -> bool {
        self.options.iter().any(|(k, _)| k == key)
    }
}

/// A tokenized service message: command name plus its keyed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMessage {
    /// Command name, e.g. `testStarted`.
    pub event: String,
    /// Unescaped fields in payload order.
    pub fields: Vec<(String, String)>,
    /// Tokens that were neither the command nor `key=value` pairs.
    pub positional: Vec<String>,
}

impl ServiceMessage {
    /// Last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }
}

/// Tokenize a service-message payload (the text between `teamcity[` and `]`).
///
/// Returns `None` when the quoting is malformed or the payload is empty.
pub fn tokenize(payload: &str) -> Option<ServiceMessage> {
    let protected = escape_single_quote(payload);
    let tokens = shell_words::split(&protected).ok()?;
    let mut tokens = tokens.into_iter();

    let event = tokens.next()?;
    if event.is_empty() || event.starts_with('-') {
        return None;
    }

    let rest: Vec<String> = tokens.collect();
    let args = collect_arguments(rest, true);

    let restore = |value: &str| unescape_single_quote(&unescape(value));

    Some(ServiceMessage {
        event: restore(&event),
        fields: args
            .options
            .into_iter()
            .map(|(key, value)| (key, restore(value.as_str())))
            .collect(),
        positional: args.positional.iter().map(|p| restore(p)).collect(),
    })
}

/// Parse a runner command line into options and positional arguments.
pub fn parse_arguments(input: &str) -> Result<ArgumentSet, shell_words::ParseError> {
    let tokens = shell_words::split(input)?;
    Ok(collect_arguments(tokens, false))
}

fn collect_arguments(tokens: Vec<String>, bare_pairs: bool) -> ArgumentSet {
    let mut args = ArgumentSet::default();
    let mut iter = tokens.into_iter().peekable();
    let mut only_positional = false;

    while let Some(token) = iter.next() {
        if only_positional {
            args.positional.push(token);
            continue;
        }

        if token == "--" {
            only_positional = true;
            continue;
        }

        if let Some(long) = token.strip_prefix("--") {
            match long.split_once('=') {
                Some((key, value)) => args
                    .options
                    .push((key.to_string(), ArgValue::Value(value.to_string()))),
                None => {
                    let value = take_value(&mut iter);
                    args.options.push((long.to_string(), value));
                }
            }
            continue;
        }

        if let Some(short) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
            if let Some((key, value)) = short.split_once('=') {
                args.options
                    .push((key.to_string(), ArgValue::Value(value.to_string())));
            } else if short.chars().count() == 1 {
                let value = take_value(&mut iter);
                args.options.push((short.to_string(), value));
            } else {
                for c in short.chars() {
                    args.options.push((c.to_string(), ArgValue::Flag));
                }
            }
            continue;
        }

        if bare_pairs {
            if let Some((key, value)) = token.split_once('=') {
                if !key.is_empty() {
                    args.options
                        .push((key.to_string(), ArgValue::Value(value.to_string())));
                    continue;
                }
            }
        }

        args.positional.push(token);
    }

    args
}

fn take_value<I>(iter: &mut std::iter::Peekable<I>) -> ArgValue
where
    I: Iterator<Item = String>,
{
    match iter.peek() {
        Some(next) if !next.starts_with('-') => ArgValue::Value(iter.next().unwrap_or_default()),
        _ => ArgValue::Flag,
    }
}
