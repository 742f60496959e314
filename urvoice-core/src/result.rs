//! Lifecycle container for one asynchronous operation
//!
//! Every repository call produces a short sequence of [`AsyncResult`] values:
//! `Loading` followed by exactly one terminal `Success` or `Error`.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};

use crate::error::{Error, ErrorKind, Failure, Result};

/// State of one asynchronous operation
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncResult<T> {
    /// No attempt has been made yet
    Initial,
    Loading,
    Success {
        value: T,
        message: Option<String>,
    },
    Error(Failure),
}

impl<T> Default for AsyncResult<T> {
    fn default() -> Self {
        Self::Initial
    }
}

/// Successful payload of a request plus the server's human readable message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub data: T,
    pub message: Option<String>,
}

impl<T> Reply<T> {
    pub fn new(data: T, message: Option<String>) -> Self {
        Self { data, message }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        Reply {
            data: f(self.data),
            message: self.message,
        }
    }
}

/// Boxed sequence of result emissions for one invocation
pub type ResultStream<T> = Pin<Box<dyn Stream<Item = AsyncResult<T>> + Send>>;

impl<T> AsyncResult<T> {
    pub fn success(value: T) -> Self {
        Self::Success {
            value,
            message: None,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error(Failure::new(kind, message))
    }

    pub fn from_result(result: Result<Reply<T>>) -> Self {
        match result {
            Ok(reply) => Self::Success {
                value: reply.data,
                message: reply.message,
            },
            Err(e) => Self::Error(e.into()),
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Initial)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// `Success` or `Error`
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_error()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Success message, if the server supplied one
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Error(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AsyncResult<U> {
        match self {
            Self::Initial => AsyncResult::Initial,
            Self::Loading => AsyncResult::Loading,
            Self::Success { value, message } => AsyncResult::Success {
                value: f(value),
                message,
            },
            Self::Error(failure) => AsyncResult::Error(failure),
        }
    }
}

impl<T> From<Error> for AsyncResult<T> {
    fn from(err: Error) -> Self {
        Self::Error(err.into())
    }
}

/// Wrap a fallible future into the standard `Loading` then terminal sequence
pub fn track<T, F>(fut: F) -> ResultStream<T>
where
    T: Send + 'static,
    F: Future<Output = Result<Reply<T>>> + Send + 'static,
{
    stream::once(async { AsyncResult::Loading })
        .chain(stream::once(async move { AsyncResult::from_result(fut.await) }))
        .boxed()
}

/// Resolve a stream to its last emission, `Initial` if it never emitted
pub async fn settle<T>(mut results: ResultStream<T>) -> AsyncResult<T> {
    let mut last = AsyncResult::Initial;
    while let Some(next) = results.next().await {
        last = next;
    }
    last
}
