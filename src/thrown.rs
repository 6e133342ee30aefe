use std::rc::Rc;

/// Dynamic value flowing through watched components: state fields, method
/// arguments, method returns, and arbitrary raised payloads.
pub type Value = serde_json::Value;

/// A failure raised by a watched method, carried as a value.
///
/// Application code is free to raise anything: a structured error type, a
/// plain object with a `message` field, a bare string, a number. Structured
/// errors ride in [`Error`](Thrown::Error), every other payload in
/// [`Value`](Thrown::Value). The interception pipeline errorizes whatever is
/// not already one of its own normalized records, so a raise that crossed
/// one wrapper passes through outer wrappers untouched.
///
/// # Examples
///
/// ```
/// use spyglass::Thrown;
/// use serde_json::json;
///
/// let raised = Thrown::text("boom");
/// assert!(!raised.is_error());
/// assert_eq!(raised.message().as_deref(), Some("boom"));
///
/// let raised = Thrown::from(json!({ "message": "boom", "code": 7 }));
/// assert_eq!(raised.message().as_deref(), Some("boom"));
///
/// let raised = Thrown::from(json!(42));
/// assert_eq!(raised.message(), None);
/// ```
#[derive(Debug, Clone)]
pub enum Thrown {
    /// A structured error.
    Error(Rc<dyn std::error::Error + 'static>),
    /// Any other raised payload.
    Value(Value),
}

impl Thrown {
    /// Wraps a structured error.
    #[inline]
    pub fn error<E: std::error::Error + 'static>(error: E) -> Self {
        Self::Error(Rc::new(error))
    }

    /// Raises a bare string payload.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Value(Value::String(text.into()))
    }

    /// True when this is a recognized structured error.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Best-effort human-readable message.
    ///
    /// Structured errors render through `Display`. A payload object with a
    /// string `message` field yields that field; a bare string yields itself;
    /// anything else yields `None`.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Error(error) => Some(error.to_string()),
            Self::Value(Value::String(text)) => Some(text.clone()),
            Self::Value(Value::Object(fields)) => match fields.get("message") {
                Some(Value::String(text)) => Some(text.clone()),
                _ => None,
            },
            Self::Value(_) => None,
        }
    }

    /// The raw payload, when this is not a structured error.
    #[inline]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Attempts to view the structured error as a concrete type.
    #[inline]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Error(error) => error.downcast_ref::<E>(),
            Self::Value(_) => None,
        }
    }
}

impl From<Value> for Thrown {
    #[inline]
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Thrown {
    #[inline]
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Thrown {
    #[inline]
    fn from(text: String) -> Self {
        Self::text(text)
    }
}
