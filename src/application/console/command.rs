use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use crate::application::errors::{BotError, ConsoleError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Console handler result
pub type HandlerResult = Result<Status, BotError>;

/// Console handler function type
pub type Handler<C> = Arc<dyn Fn(C, ParsedArgs) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Outcome reported by a console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::Failure => 1,
        }
    }
}

/// Kind of a console parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Str,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Str => "str",
        }
    }

    /// Coerce a raw token into a value of this kind
    pub fn coerce(self, name: &str, token: &str) -> Result<ArgValue, ConsoleError> {
        let invalid = || ConsoleError::InvalidType {
            name: name.to_string(),
            kind: self.as_str(),
        };
        match self {
            ParamKind::Bool => parse_bool(token).map(ArgValue::Bool).ok_or_else(invalid),
            ParamKind::Int => token.trim().parse::<i64>().map(ArgValue::Int).map_err(|_| invalid()),
            ParamKind::Str => Ok(ArgValue::Str(token.to_string())),
        }
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// A parsed argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ArgValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ArgValue::Bool(_) => ParamKind::Bool,
            ArgValue::Int(_) => ParamKind::Int,
            ArgValue::Str(_) => ParamKind::Str,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Declared console parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<ArgValue>,
}

/// Arguments after coercion, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    values: HashMap<String, ArgValue>,
}

impl ParsedArgs {
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn bool(&self, name: &str) -> Result<bool, ConsoleError> {
        match self.values.get(name) {
            Some(ArgValue::Bool(b)) => Ok(*b),
            Some(_) => Err(self.wrong_kind(name, ParamKind::Bool)),
            None => Err(ConsoleError::MissingArgument(name.to_string())),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, ConsoleError> {
        match self.values.get(name) {
            Some(ArgValue::Int(i)) => Ok(*i),
            Some(_) => Err(self.wrong_kind(name, ParamKind::Int)),
            None => Err(ConsoleError::MissingArgument(name.to_string())),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, ConsoleError> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Ok(s),
            Some(_) => Err(self.wrong_kind(name, ParamKind::Str)),
            None => Err(ConsoleError::MissingArgument(name.to_string())),
        }
    }

    fn wrong_kind(&self, name: &str, kind: ParamKind) -> ConsoleError {
        ConsoleError::InvalidType {
            name: name.to_string(),
            kind: kind.as_str(),
        }
    }
}

/// Represents a console command
pub struct ConsoleCommand<C> {
    pub name: String,
    pub description: Option<String>,
    pub params: Vec<Param>,
    pub handler: Option<Handler<C>>,
}

impl<C: Send + 'static> ConsoleCommand<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Add a required parameter
    pub fn with_param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind,
            default: None,
        });
        self
    }

    /// Add a parameter that falls back to `default` when not supplied
    pub fn with_optional(mut self, name: impl Into<String>, default: ArgValue) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: default.kind(),
            default: Some(default),
        });
        self
    }

    pub fn with_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(C, ParsedArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: Handler<C> = Arc::new(move |ctx: C, args: ParsedArgs| -> BoxFuture<'static, HandlerResult> {
            Box::pin(handler(ctx, args))
        });
        self.handler = Some(handler);
        self
    }

    /// Coerce raw tokens against the declared parameters
    pub fn parse_args(&self, tokens: &[String]) -> Result<ParsedArgs, ConsoleError> {
        if tokens.len() > self.params.len() {
            return Err(ConsoleError::TooManyArguments {
                expected: self.params.len(),
                got: tokens.len(),
            });
        }

        let mut args = ParsedArgs::default();
        for (param, token) in self.params.iter().zip(tokens) {
            args.insert(param.name.clone(), param.kind.coerce(&param.name, token)?);
        }

        for param in &self.params[tokens.len()..] {
            match &param.default {
                Some(default) => args.insert(param.name.clone(), default.clone()),
                None => return Err(ConsoleError::MissingArgument(param.name.clone())),
            }
        }

        Ok(args)
    }

    /// Parse the tokens and run the handler
    pub async fn execute(&self, ctx: C, tokens: &[String]) -> HandlerResult {
        let args = self.parse_args(tokens)?;
        match &self.handler {
            Some(handler) => handler(ctx, args).await,
            None => Ok(Status::Success),
        }
    }

    /// Usage line, e.g. `server info <guild_id:int> [show_members:bool=false]`
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for param in &self.params {
            match &param.default {
                Some(default) => {
                    usage.push_str(&format!(" [{}:{}={}]", param.name, param.kind.as_str(), default))
                }
                None => usage.push_str(&format!(" <{}:{}>", param.name, param.kind.as_str())),
            }
        }
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn server_info() -> ConsoleCommand<()> {
        ConsoleCommand::new("server info")
            .with_param("guild_id", ParamKind::Int)
            .with_optional("show_members", ArgValue::Bool(false))
    }

    #[test]
    fn bool_accepts_exact_literal_sets() {
        for token in ["true", "YES", "1", "True"] {
            assert_eq!(ParamKind::Bool.coerce("flag", token), Ok(ArgValue::Bool(true)));
        }
        for token in ["false", "No", "0", "FALSE"] {
            assert_eq!(ParamKind::Bool.coerce("flag", token), Ok(ArgValue::Bool(false)));
        }
        for token in ["y", "on", "2", "", "truthy"] {
            assert_eq!(
                ParamKind::Bool.coerce("flag", token),
                Err(ConsoleError::InvalidType { name: "flag".into(), kind: "bool" })
            );
        }
    }

    #[test]
    fn int_rejects_malformed_tokens() {
        assert_eq!(ParamKind::Int.coerce("id", "42"), Ok(ArgValue::Int(42)));
        assert_eq!(ParamKind::Int.coerce("id", "-3"), Ok(ArgValue::Int(-3)));
        assert!(matches!(ParamKind::Int.coerce("id", "4x2"), Err(ConsoleError::InvalidType { .. })));
    }

    #[test]
    fn defaults_fill_missing_optional_params() {
        let args = server_info().parse_args(&tokens(&["123"])).unwrap();
        assert_eq!(args.int("guild_id"), Ok(123));
        assert_eq!(args.bool("show_members"), Ok(false));

        let args = server_info().parse_args(&tokens(&["123", "yes"])).unwrap();
        assert_eq!(args.bool("show_members"), Ok(true));
    }

    #[test]
    fn argument_count_is_checked_both_ways() {
        assert_eq!(
            server_info().parse_args(&tokens(&["1", "true", "extra"])),
            Err(ConsoleError::TooManyArguments { expected: 2, got: 3 })
        );
        assert_eq!(
            server_info().parse_args(&[]),
            Err(ConsoleError::MissingArgument("guild_id".into()))
        );
    }

    #[test]
    fn typed_getters_report_wrong_kind() {
        let args = server_info().parse_args(&tokens(&["5"])).unwrap();
        assert!(matches!(args.string("guild_id"), Err(ConsoleError::InvalidType { .. })));
        assert_eq!(args.int("nope"), Err(ConsoleError::MissingArgument("nope".into())));
    }

    #[test]
    fn usage_lists_params() {
        assert_eq!(server_info().usage(), "server info <guild_id:int> [show_members:bool=false]");
    }
}
