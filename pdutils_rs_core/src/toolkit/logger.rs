//! # toolkit/logger
//!
//! structured call tracing for callables that take dynamic arguments.
//!
//! source text can't be recovered at runtime, so it has to be embedded at compile time,
//! which is what [`logged!`](crate::logged) does with `stringify!`.

use std::time::Instant;

use crate::df::Value;

use super::signature::Kwargs;

pub struct CallLogger<F> {
    name: String,
    func: F,
    source: Option<&'static str>,
}

impl<F> CallLogger<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            source: None,
        }
    }
    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }

    /// log the call, then delegate and hand the result back untouched
    pub fn call<R>(&self, args: &[Value], kwargs: &Kwargs) -> R
    where
        F: Fn(&[Value], &Kwargs) -> R,
    {
        tracing::info!(function = %self.name, ?args, ?kwargs, "calling function");
        if let Some(source) = self.source {
            tracing::info!(function = %self.name, source, "function source");
        }
        let started = Instant::now();
        let result = (self.func)(args, kwargs);
        tracing::debug!(
            function = %self.name,
            elapsed_us = started.elapsed().as_micros() as u64,
            "function returned"
        );
        result
    }
}

/// wrap a callable into a [`CallLogger`]
///
/// ```
/// use pdutils_core::{df::Value, logged, toolkit::signature::Kwargs};
///
/// let add = logged!("add", |args: &[Value], _: &Kwargs| args.len(), show_source);
/// assert_eq!(add.call(&[Value::Int(1)], &[]), 1);
/// ```
#[macro_export]
macro_rules! logged {
    ($name:expr, $func:expr, show_source) => {
        $crate::toolkit::logger::CallLogger::new($name, $func).with_source(stringify!($func))
    };
    ($name:expr, $func:expr) => {
        $crate::toolkit::logger::CallLogger::new($name, $func)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }
    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn sum(args: &[Value], _: &Kwargs) -> i64 {
        args.iter().filter_map(|v| v.as_f64()).sum::<f64>() as i64
    }

    fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, captured.text())
    }

    #[test]
    fn test_call_is_logged_and_delegated() {
        let logger = CallLogger::new("sum", sum);
        let kwargs = vec![("scale".to_string(), Value::Int(2))];
        let (result, logs) = capture(|| logger.call(&[Value::Int(1), Value::Int(2)], &kwargs));
        assert_eq!(result, 3);
        assert!(logs.contains("calling function"), "{logs}");
        assert!(logs.contains("function=sum"), "{logs}");
        assert!(logs.contains("Int(1)") && logs.contains("scale"), "{logs}");
        assert!(!logs.contains("function source"), "{logs}");
    }

    #[test]
    fn test_show_source() {
        let logger = crate::logged!("len", |args: &[Value], _: &Kwargs| args.len(), show_source);
        assert_eq!(logger.name(), "len");
        let (result, logs) = capture(|| logger.call(&[Value::Null], &[]));
        assert_eq!(result, 1);
        assert!(logs.contains("function source"), "{logs}");
        assert!(logs.contains("args.len()"), "{logs}");
    }
}
