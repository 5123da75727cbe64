//! Parameter validation for public sketch entry points.
//!
//! Runs as the first step of `createCanvas`, `createGraphics`,
//! `resizeCanvas` and `blendMode`, before any state is touched.

use crate::backend::Backend;
use crate::error::{EaselError, Result};

/// One argument passed to a public entry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    Number(f64),
    Text(&'a str),
    Flag(bool),
    Backend(Backend),
}

impl Arg<'_> {
    fn type_name(&self) -> &'static str {
        match self {
            Arg::Number(_) => "number",
            Arg::Text(_) => "string",
            Arg::Flag(_) => "boolean",
            Arg::Backend(_) => "renderer constant",
        }
    }
}

/// Checks the arguments of a named call.
pub trait ParamValidator {
    fn validate(&self, call: &str, args: &[Arg<'_>]) -> Result<()>;
}

/// Friendly-error checks: numbers must be finite, strings non-empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FriendlyValidator;

impl ParamValidator for FriendlyValidator {
    fn validate(&self, call: &str, args: &[Arg<'_>]) -> Result<()> {
        for (position, arg) in args.iter().enumerate() {
            let problem = match arg {
                Arg::Number(n) if n.is_nan() => Some("is NaN".to_string()),
                Arg::Number(n) if n.is_infinite() => Some(format!("is {n}")),
                Arg::Text(s) if s.trim().is_empty() => Some("is an empty string".to_string()),
                _ => None,
            };
            if let Some(problem) = problem {
                let expected = match arg {
                    Arg::Number(_) => "finite number",
                    other => other.type_name(),
                };
                log::debug!("{call}: rejecting argument #{}", position + 1);
                return Err(EaselError::validation(
                    call,
                    format!("argument #{} {problem}, expected a {expected}", position + 1),
                ));
            }
        }
        Ok(())
    }
}

/// Accepts everything; used when friendly errors are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoValidation;

impl ParamValidator for NoValidation {
    fn validate(&self, _call: &str, _args: &[Arg<'_>]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_arguments() {
        let args = [Arg::Number(400.0), Arg::Number(-3.0), Arg::Backend(Backend::Accelerated3d)];
        assert!(FriendlyValidator.validate("createCanvas", &args).is_ok());
    }

    #[test]
    fn rejects_nan_with_position() {
        let err = FriendlyValidator
            .validate("resizeCanvas", &[Arg::Number(10.0), Arg::Number(f64::NAN)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "resizeCanvas(): argument #2 is NaN, expected a finite number"
        );
    }

    #[test]
    fn rejects_empty_mode_token() {
        let err = FriendlyValidator.validate("blendMode", &[Arg::Text("  ")]).unwrap_err();
        assert!(matches!(err, EaselError::Validation { ref call, .. } if call == "blendMode"));
    }

    #[test]
    fn no_validation_accepts_anything() {
        assert!(NoValidation.validate("createCanvas", &[Arg::Number(f64::NAN)]).is_ok());
    }
}
