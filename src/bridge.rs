//! Error-report boundary towards a host runtime.
//!
//! The host registers the exception classes it wants errors raised as, once
//! per process. Kernel calls made through [`guard`] then never unwind or
//! leak a [`HashError`] across the boundary: both are turned into a
//! [`BridgeError::Thrown`] naming the class to raise and the message (and,
//! for panics, the stack trace) to raise it with.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use tracing::{error, info};

use crate::error::HashError;

/// Category of host exception an error maps to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    Runtime,
    UnsupportedOperation,
    IllegalArgument,
    // Kernel errors never map to these two. They complete the host's class
    // table for callers raising their own failures through it.
    IllegalAccess,
    Io,
}

/// A failure ready to be raised on the host side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ExceptionKind,
    pub message: String,
    pub stack_trace: Option<String>,
}

impl ErrorReport {
    pub fn runtime(message: impl Into<String>, stack_trace: Option<String>) -> Self {
        Self {
            kind: ExceptionKind::Runtime,
            message: message.into(),
            stack_trace,
        }
    }
}

impl From<&HashError> for ErrorReport {
    fn from(err: &HashError) -> Self {
        let kind = match err {
            HashError::NotImplemented { .. } => ExceptionKind::UnsupportedOperation,
            HashError::IllegalColumn { .. } => ExceptionKind::IllegalArgument,
            HashError::SizeMismatch { .. } => ExceptionKind::Runtime,
        };
        Self {
            kind,
            message: err.to_string(),
            stack_trace: None,
        }
    }
}

/// Host class names, one per [`ExceptionKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionClasses {
    pub runtime: String,
    pub unsupported_operation: String,
    pub illegal_argument: String,
    pub illegal_access: String,
    pub io: String,
}

impl ExceptionClasses {
    pub fn class_of(&self, kind: ExceptionKind) -> &str {
        match kind {
            ExceptionKind::Runtime => &self.runtime,
            ExceptionKind::UnsupportedOperation => &self.unsupported_operation,
            ExceptionKind::IllegalArgument => &self.illegal_argument,
            ExceptionKind::IllegalAccess => &self.illegal_access,
            ExceptionKind::Io => &self.io,
        }
    }
}

impl Default for ExceptionClasses {
    /// The JVM's own classes.
    fn default() -> Self {
        Self {
            runtime: "java/lang/RuntimeException".into(),
            unsupported_operation: "java/lang/UnsupportedOperationException".into(),
            illegal_argument: "java/lang/IllegalArgumentException".into(),
            illegal_access: "java/lang/IllegalAccessException".into(),
            io: "java/io/IOException".into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("error bridge is already initialized")]
    AlreadyInitialized,
    #[error("error bridge is not initialized")]
    NotInitialized,
    #[error("{class_name}: {}", .report.message)]
    Thrown {
        class_name: String,
        report: ErrorReport,
    },
}

const UNKNOWN_EXCEPTION: &str = "Unknown Exception";

static CLASSES: RwLock<Option<ExceptionClasses>> = RwLock::new(None);

/// Registers the host's exception classes. Fails if already registered.
pub fn initialize(classes: ExceptionClasses) -> Result<(), BridgeError> {
    let mut state = CLASSES.write().unwrap_or_else(PoisonError::into_inner);
    if state.is_some() {
        return Err(BridgeError::AlreadyInitialized);
    }
    info!(runtime = %classes.runtime, "error bridge initialized");
    *state = Some(classes);
    Ok(())
}

/// Drops the registered classes. Returns whether anything was registered.
pub fn destroy() -> bool {
    CLASSES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .is_some()
}

pub fn is_initialized() -> bool {
    CLASSES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Runs `f`, translating errors and panics into [`BridgeError::Thrown`].
pub fn guard<T>(f: impl FnOnce() -> crate::Result<T>) -> Result<T, BridgeError> {
    let classes = CLASSES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(BridgeError::NotInitialized)?;

    let report = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => ErrorReport::from(&err),
        Err(payload) => {
            let trace = Backtrace::force_capture().to_string();
            ErrorReport::runtime(panic_message(payload.as_ref()), Some(trace))
        }
    };

    let class_name = classes.class_of(report.kind).to_owned();
    error!(class = %class_name, message = %report.message, "raising host exception");
    Err(BridgeError::Thrown { class_name, report })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        UNKNOWN_EXCEPTION.to_owned()
    }
}
