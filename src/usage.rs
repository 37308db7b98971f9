//! Incorrect-usage channel.
//!
//! Schema authoring mistakes (a missing or unknown `type`, a pattern that
//! does not compile) are not value errors: the walk carries on leniently and
//! the mistake is reported here instead. Every notice is logged through
//! `tracing` under the `rest_schema::usage` target and, unless disabled in
//! [`SchemaOptions`], returned to the caller in a [`Report`].

use serde::Serialize;

use crate::error::{ErrorCode, SchemaError};
use crate::types::{ParamPath, SchemaOptions, BUILT_IN_TYPES};

/// Kind of schema mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    MissingType,
    UnknownType,
    InvalidPattern,
}

/// A developer-facing warning about the schema itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageNotice {
    pub kind: UsageKind,
    pub param: String,
    pub message: String,
}

/// Outcome of a validate or sanitize call together with any usage notices.
#[derive(Debug, Clone)]
pub struct Report<T> {
    pub result: Result<T, SchemaError>,
    pub notices: Vec<UsageNotice>,
}

impl<T> Report<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Drop the notices and keep the outcome.
    pub fn into_result(self) -> Result<T, SchemaError> {
        self.result
    }
}

/// State threaded through one validate or sanitize call.
pub(crate) struct Context<'o> {
    options: &'o SchemaOptions,
    notices: Vec<UsageNotice>,
    depth: usize,
}

impl<'o> Context<'o> {
    pub(crate) fn new(options: &'o SchemaOptions) -> Self {
        Self {
            options,
            notices: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn finish<T>(self, result: Result<T, SchemaError>) -> Report<T> {
        Report {
            result,
            notices: self.notices,
        }
    }

    /// Run `f` one level deeper, failing once the configured depth is exceeded.
    pub(crate) fn nested<T>(
        &mut self,
        path: &ParamPath,
        f: impl FnOnce(&mut Self) -> Result<T, SchemaError>,
    ) -> Result<T, SchemaError> {
        if self.depth >= self.options.max_depth {
            return Err(SchemaError::new(
                ErrorCode::SchemaTooDeep,
                format!(
                    "{} exceeds the maximum schema depth of {}.",
                    path, self.options.max_depth
                ),
            )
            .with_param(path.to_string()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn missing_type(&mut self, path: &ParamPath) {
        self.notice(
            UsageKind::MissingType,
            path,
            format!("The \"type\" schema keyword for {} is required.", path),
        );
    }

    pub(crate) fn unknown_type(&mut self, path: &ParamPath, in_list: bool) {
        let verb = if in_list { "contain" } else { "be one of" };
        self.notice(
            UsageKind::UnknownType,
            path,
            format!(
                "The \"type\" schema keyword for {} can only {} the built-in types: {}.",
                path,
                verb,
                list_and(BUILT_IN_TYPES)
            ),
        );
    }

    pub(crate) fn invalid_pattern(&mut self, path: &ParamPath, pattern: &str, reason: &str) {
        self.notice(
            UsageKind::InvalidPattern,
            path,
            format!("The pattern {} for {} does not compile: {}", pattern, path, reason),
        );
    }

    fn notice(&mut self, kind: UsageKind, path: &ParamPath, message: String) {
        let param = path.to_string();
        tracing::warn!(target: "rest_schema::usage", param = %param, kind = ?kind, "{}", message);
        if self.options.collect_notices {
            self.notices.push(UsageNotice {
                kind,
                param,
                message,
            });
        }
    }
}

/// Join items as `a, b, and c` / `a and b` / `a`.
pub(crate) fn list_and<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_and_joins_like_prose() {
        assert_eq!(list_and::<&str>(&[]), "");
        assert_eq!(list_and(&["a"]), "a");
        assert_eq!(list_and(&["a", "b"]), "a and b");
        assert_eq!(list_and(&["a", "b", "c"]), "a, b, and c");
    }

    #[test]
    fn notices_collected_when_enabled() {
        let options = SchemaOptions::new();
        let mut ctx = Context::new(&options);
        ctx.missing_type(&ParamPath::new("foo"));
        let report = ctx.finish(Ok(()));
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].kind, UsageKind::MissingType);
        assert_eq!(
            report.notices[0].message,
            "The \"type\" schema keyword for foo is required."
        );
    }

    #[test]
    fn notices_dropped_when_disabled() {
        let options = SchemaOptions::new().collect_notices(false);
        let mut ctx = Context::new(&options);
        ctx.unknown_type(&ParamPath::new("foo"), false);
        assert!(ctx.finish(Ok(())).notices.is_empty());
    }

    #[test]
    fn nested_enforces_depth() {
        let options = SchemaOptions::new().max_depth(1);
        let mut ctx = Context::new(&options);
        let path = ParamPath::new("foo");
        let result = ctx.nested(&path, |ctx| ctx.nested(&path.key("a"), |_| Ok(())));
        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaTooDeep);
        assert_eq!(err.param.as_deref(), Some("foo[a]"));
    }
}
