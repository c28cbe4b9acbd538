//! Error reporting service

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::error;

/// Logs reported errors with their source chain.
#[derive(Debug, Default)]
pub struct ErrorHandler {
    reported: AtomicUsize,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `err` and every error in its source chain.
    pub fn report(&self, err: &(dyn std::error::Error + 'static)) {
        self.reported.fetch_add(1, Ordering::Relaxed);

        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        if chain.is_empty() {
            error!(error = %err, "unhandled error");
        } else {
            error!(error = %err, caused_by = ?chain, "unhandled error");
        }
    }

    /// Number of errors reported so far
    pub fn reported(&self) -> usize {
        self.reported.load(Ordering::Relaxed)
    }

    /// Route panics through tracing, keeping the previous hook's output.
    pub fn install_panic_hook() {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_default();
            error!(%location, "panic: {}", panic_message(info.payload()));
            previous(info);
        }));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_report_counts() {
        let handler = ErrorHandler::new();
        handler.report(&Outer(std::io::Error::other("inner")));
        handler.report(&std::io::Error::other("plain"));
        assert_eq!(handler.reported(), 2);
    }

    #[test]
    fn test_panic_message() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "non-string panic payload");
    }
}
