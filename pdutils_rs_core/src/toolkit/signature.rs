//! # toolkit/signature
//!
//! runtime type checking for dynamically typed call boundaries.
//!
//! a [`Signature`] lists the parameters of a callable, each optionally carrying an
//! annotation and/or a default value. [`Signature::check`] applies these rules:
//!
//! - a positional argument passes if its kind equals the annotation, or equals the kind
//!   of the default, or if the parameter has neither (unconstrained)
//! - a keyword argument passes only if its kind equals the kind of the default
//!
//! every offending parameter is collected into a single [`PdError::TypeMismatch`].

use crate::{
    df::{Value, ValueKind},
    error::{Mismatch, PdError, Result},
};

pub type Kwargs = [(String, Value)];

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<ValueKind>,
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }
    pub fn annotated(mut self, kind: ValueKind) -> Self {
        self.annotation = Some(kind);
        self
    }
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn default_kind(&self) -> Option<ValueKind> {
        self.default.as_ref().map(Value::kind)
    }

    fn accepts_positional(&self, kind: ValueKind) -> bool {
        self.annotation == Some(kind)
            || (self.annotation.is_none() && self.default.is_none())
            || self.default_kind() == Some(kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// # Errors
    ///
    /// - [`PdError::Validation`] for surplus positional arguments, unknown keyword names
    ///   or a parameter given both positionally and by keyword
    /// - [`PdError::TypeMismatch`] listing every parameter whose argument has a wrong kind
    pub fn check(&self, args: &[Value], kwargs: &Kwargs) -> Result<()> {
        let arg_kinds: Vec<ValueKind> = args.iter().map(Value::kind).collect();
        let kwarg_kinds: Vec<(&str, ValueKind)> = kwargs
            .iter()
            .map(|(name, value)| (name.as_str(), value.kind()))
            .collect();
        self.check_kinds(&arg_kinds, &kwarg_kinds)
    }

    /// [`Signature::check`] on the runtime kinds alone, for callers whose arguments
    /// can't all be represented as a [`Value`] (see [`ValueKind::Other`])
    pub fn check_kinds(&self, args: &[ValueKind], kwargs: &[(&str, ValueKind)]) -> Result<()> {
        if args.len() > self.params.len() {
            return Err(PdError::validation(format!(
                "takes {} positional argument(s) but {} were given",
                self.params.len(),
                args.len()
            )));
        }
        let mut mismatches = Vec::new();
        for (param, &kind) in self.params.iter().zip(args) {
            if !param.accepts_positional(kind) {
                mismatches.push(Mismatch {
                    name: param.name.clone(),
                    received: kind,
                    expected: param.annotation.or_else(|| param.default_kind()),
                });
            }
        }
        for &(name, kind) in kwargs {
            let Some(position) = self.params.iter().position(|p| p.name == name) else {
                return Err(PdError::validation(format!(
                    "got an unexpected keyword argument `{name}`"
                )));
            };
            if position < args.len() {
                return Err(PdError::validation(format!(
                    "got multiple values for argument `{name}`"
                )));
            }
            let param = &self.params[position];
            if param.default_kind() != Some(kind) {
                mismatches.push(Mismatch {
                    name: name.to_string(),
                    received: kind,
                    expected: param.default_kind(),
                });
            }
        }
        if mismatches.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = mismatches.len(), "type check failed");
            Err(PdError::TypeMismatch(mismatches))
        }
    }
}

/// a callable guarded by a [`Signature`]
pub struct TypeChecked<F> {
    signature: Signature,
    func: F,
}

impl<F> TypeChecked<F> {
    pub fn new(signature: Signature, func: F) -> Self {
        Self { signature, func }
    }
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// check the arguments, then delegate to the wrapped callable with them unchanged
    pub fn call<R>(&self, args: &[Value], kwargs: &Kwargs) -> Result<R>
    where
        F: Fn(&[Value], &Kwargs) -> R,
    {
        self.signature.check(args, kwargs)?;
        Ok((self.func)(args, kwargs))
    }
}

pub fn type_check<F>(signature: Signature, func: F) -> TypeChecked<F> {
    TypeChecked::new(signature, func)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `(b: str, c, d=1)`
    fn abcd() -> Signature {
        Signature::default()
            .param(Param::new("b").annotated(ValueKind::Str))
            .param(Param::new("c"))
            .param(Param::new("d").with_default(1))
    }

    fn kw(name: &str, value: impl Into<Value>) -> (String, Value) {
        (name.to_string(), value.into())
    }

    #[test]
    fn test_default_inferred_type() {
        let sig = abcd();
        let err = sig
            .check(&["1".into(), "2".into(), "x".into()], &[])
            .unwrap_err();
        match err {
            PdError::TypeMismatch(mismatches) => {
                assert_eq!(mismatches.len(), 1);
                assert_eq!(mismatches[0].name, "d");
                assert_eq!(mismatches[0].received, ValueKind::Str);
                assert_eq!(mismatches[0].expected, Some(ValueKind::Int));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(sig.check(&["1".into(), "2".into(), 1.into()], &[]).is_ok());
        assert!(sig.check(&["1".into(), "2".into(), 0.5.into()], &[]).is_err());
    }

    #[test]
    fn test_unconstrained_and_keyword_arguments() {
        let sig = abcd();
        assert!(sig.check(&["1".into(), 2.into()], &[kw("d", 1)]).is_ok());
        assert!(sig.check(&["1".into(), Value::Null], &[]).is_ok());
        assert!(sig.check(&["1".into()], &[kw("d", "x")]).is_err());
        // keyword arguments are only checked against defaults
        assert!(sig.check(&["1".into()], &[kw("c", "2")]).is_err());
    }

    #[test]
    fn test_every_offender_is_reported() {
        let err = abcd()
            .check(&[1.into(), "2".into(), "c".into()], &[])
            .unwrap_err();
        match err {
            PdError::TypeMismatch(mismatches) => {
                let names: Vec<&str> = mismatches.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(names, vec!["b", "d"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_structural_errors() {
        let sig = abcd();
        let too_many = sig.check(&[1.into(), 2.into(), 3.into(), 4.into()], &[]);
        assert!(matches!(too_many, Err(PdError::Validation(_))));
        let unknown = sig.check(&[], &[kw("e", 1)]);
        assert!(matches!(unknown, Err(PdError::Validation(_))));
        let twice = sig.check(&["1".into()], &[kw("b", "1")]);
        assert!(matches!(twice, Err(PdError::Validation(_))));
    }

    #[test]
    fn test_wrapped_callable_runs_only_when_valid() {
        let checked = type_check(abcd(), |args: &[Value], _: &Kwargs| args.len());
        assert_eq!(checked.call(&["1".into(), "2".into(), 1.into()], &[]).unwrap(), 3);
        assert!(checked.call(&["1".into(), "2".into(), "x".into()], &[]).is_err());
    }

    #[test]
    fn test_opaque_kinds() {
        let sig = abcd();
        // anything goes for an unconstrained parameter
        assert!(sig
            .check_kinds(&[ValueKind::Str, ValueKind::Other], &[])
            .is_ok());
        let err = sig
            .check_kinds(&[ValueKind::Other], &[("d", ValueKind::Other)])
            .unwrap_err();
        match err {
            PdError::TypeMismatch(mismatches) => {
                let names: Vec<&str> = mismatches.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(names, vec!["b", "d"]);
                assert_eq!(mismatches[1].received, ValueKind::Other);
            }
            other => panic!("unexpected error: {other}"),
        }
        let float_default = Signature::default().param(Param::new("x").with_default(1.0));
        assert!(float_default.check_kinds(&[ValueKind::Float], &[]).is_ok());
    }
}
