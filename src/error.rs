//! The normalized error record and its constructor.
//!
//! When a watched method raises something that is not already a structured
//! error and the active configuration says to errorize, the raw payload is
//! wrapped in a [`SpyglassError`] carrying provenance: which component, under
//! what name and id, through which member. The original payload is kept
//! untouched and reachable through [`SpyglassError::original`].

use std::backtrace::Backtrace;
use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::thrown::{Thrown, Value};

/// A normalized error produced from an arbitrary raised payload.
///
/// Immutable once constructed, except for the re-raise marker the
/// interception pipeline sets just before propagating it.
///
/// # Examples
///
/// ```
/// use spyglass::{SpyglassError, Thrown};
/// use serde_json::json;
///
/// let err = SpyglassError::normalize(
///     Thrown::from(json!({ "message": "boom" })),
///     Some("Teller"),
///     Some("till-3"),
///     "withdraw",
///     None,
/// );
/// assert_eq!(err.to_string(), "Error [Teller(till-3):withdraw] boom");
/// assert!(!err.rethrown());
/// ```
pub struct SpyglassError {
    message: String,
    error: Thrown,
    target: Option<Component>,
    name: Option<String>,
    id: Option<String>,
    member: String,
    backtrace: Option<Backtrace>,
    rethrown: Cell<bool>,
}

impl SpyglassError {
    /// Builds the normalized record for a raised payload.
    ///
    /// The message always follows `Error [PREFIX:MEMBER] ORIGINAL`, where
    /// `PREFIX` is `name(id)`, `name`, `(id)`, or empty, and `ORIGINAL` is
    /// the payload's `message` field if it is an object carrying a string
    /// one, the payload itself if it is a bare string, and nothing otherwise
    /// (numbers and other shapes get no suffix). Never fails, whatever the
    /// payload looks like.
    pub fn normalize(
        error: Thrown,
        name: Option<&str>,
        id: Option<&str>,
        member: &str,
        target: Option<&Component>,
    ) -> Self {
        let prefix = match (name, id) {
            (Some(name), Some(id)) => format!("{name}({id})"),
            (Some(name), None) => name.to_string(),
            (None, Some(id)) => format!("({id})"),
            (None, None) => String::new(),
        };
        let mut message = format!("Error [{prefix}:{member}] ");
        if let Some(original) = error.message() {
            message.push_str(&original);
        }
        Self {
            message,
            error,
            target: target.cloned(),
            name: name.map(str::to_owned),
            id: id.map(str::to_owned),
            member: member.to_owned(),
            backtrace: None,
            rethrown: Cell::new(false),
        }
    }

    /// Attaches a backtrace captured here; honored when the configuration
    /// sets `add_stack_trace`. Exposure follows `RUST_BACKTRACE` semantics.
    pub fn with_backtrace(mut self) -> Self {
        self.backtrace = Some(Backtrace::capture());
        self
    }

    /// The full normalized message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The payload originally raised by the watched method.
    #[inline]
    pub fn original(&self) -> &Thrown {
        &self.error
    }

    /// The component the failing member belonged to, when it was still
    /// alive at normalization time.
    #[inline]
    pub fn target(&self) -> Option<&Component> {
        self.target.as_ref()
    }

    /// Component name the target was watched under.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Unique id the target was watched under.
    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The member that raised.
    #[inline]
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The captured backtrace, when `add_stack_trace` asked for one.
    #[inline]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    /// True once the interception pipeline has re-raised this error.
    #[inline]
    pub fn rethrown(&self) -> bool {
        self.rethrown.get()
    }

    pub(crate) fn mark_rethrown(&self) {
        self.rethrown.set(true);
    }

    /// A serializable summary for shipping to logs or metrics sinks.
    pub fn report(&self) -> Report {
        Report {
            message: self.message.clone(),
            name: self.name.clone(),
            id: self.id.clone(),
            member: self.member.clone(),
            rethrown: self.rethrown.get(),
            original: match &self.error {
                Thrown::Value(value) => Some(value.clone()),
                Thrown::Error(_) => None,
            },
        }
    }
}

impl fmt::Display for SpyglassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for SpyglassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpyglassError")
            .field("message", &self.message)
            .field("error", &self.error)
            .field("name", &self.name)
            .field("id", &self.id)
            .field("member", &self.member)
            .field("rethrown", &self.rethrown.get())
            .finish_non_exhaustive()
    }
}

impl std::error::Error for SpyglassError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.error {
            Thrown::Error(error) => Some(error.as_ref()),
            Thrown::Value(_) => None,
        }
    }
}

/// True when a raised value is a [`SpyglassError`].
///
/// # Examples
///
/// ```
/// use spyglass::{is_spyglass_error, SpyglassError, Thrown};
///
/// let raised = Thrown::text("boom");
/// assert!(!is_spyglass_error(&raised));
///
/// let normalized = SpyglassError::normalize(raised, None, None, "trick", None);
/// assert!(is_spyglass_error(&Thrown::error(normalized)));
/// ```
pub fn is_spyglass_error(thrown: &Thrown) -> bool {
    thrown.downcast_ref::<SpyglassError>().is_some()
}

/// Flat, serializable view of a [`SpyglassError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// The normalized message.
    pub message: String,
    /// Component name, if any.
    pub name: Option<String>,
    /// Unique id, if any.
    pub id: Option<String>,
    /// Member that raised.
    pub member: String,
    /// Whether the error was re-raised by the pipeline.
    pub rethrown: bool,
    /// The raw payload, when it was a plain value.
    pub original: Option<Value>,
}
