//! Declaration-site sugar: [`component!`](crate::component!),
//! [`watched!`](crate::watched), and [`raise!`](crate::raise).
//!
//! # Examples
//!
//! ```
//! use spyglass::{component, configure, raise, Config};
//! use serde_json::json;
//!
//! let profile = configure(("Teller", Config::new().set_rethrow(false)));
//!
//! let teller = spyglass::watched!(
//!     profile,
//!     component! {
//!         state: { "till": 100 },
//!         withdraw(this, args) => {
//!             let amount = args.first().and_then(|v| v.as_i64()).unwrap_or(0);
//!             let till = this.field("till").and_then(|v| v.as_i64()).unwrap_or(0);
//!             if amount > till {
//!                 raise!("insufficient funds");
//!             }
//!             this.set_field("till", till - amount);
//!             Ok(json!(till - amount))
//!         },
//!     }
//! )
//! .unwrap();
//!
//! assert_eq!(teller.call("withdraw", &[json!(30)]).unwrap(), json!(70));
//! assert!(teller.call("withdraw", &[json!(999)]).unwrap().is_null());
//! ```

/// Declares a [`Component`](crate::Component) in place: optional JSON state
/// plus named methods.
///
/// Each method receives the component handle and an argument slice, and
/// returns a [`CallResult`](crate::CallResult).
///
/// # Examples
///
/// ```
/// use spyglass::component;
/// use serde_json::json;
///
/// let counter = component! {
///     state: { "count": 0 },
///     bump(this, args) => {
///         let step = args.first().and_then(|v| v.as_i64()).unwrap_or(1);
///         let count = this.field("count").and_then(|v| v.as_i64()).unwrap_or(0);
///         this.set_field("count", count + step);
///         Ok(json!(count + step))
///     },
/// };
///
/// assert_eq!(counter.call("bump", &[]).unwrap(), json!(1));
/// assert_eq!(counter.call("bump", &[json!(10)]).unwrap(), json!(11));
/// ```
#[macro_export]
macro_rules! component {
    (
        state: $state:tt
        $(, $method:ident ($recv:ident, $args:ident) => $body:block )*
        $(,)?
    ) => {{
        let __component = $crate::Component::object($crate::__serde_json::json!($state));
        $(
            let __component = __component.method(
                stringify!($method),
                move |$recv: &$crate::Component, $args: &[$crate::Value]| -> $crate::CallResult {
                    let _ = (&$recv, &$args);
                    $body
                },
            );
        )*
        __component
    }};
    (
        $( $method:ident ($recv:ident, $args:ident) => $body:block ),*
        $(,)?
    ) => {
        $crate::component! {
            state: null
            $(, $method ($recv, $args) => $body )*
        }
    };
}

/// Applies a [`Profile`](crate::Profile) to a component at definition time;
/// the decorator-style spelling of `profile.watch(component, ...)`.
#[macro_export]
macro_rules! watched {
    ($profile:expr, $component:expr $(,)?) => {
        $profile.watch($component, ())
    };
    ($profile:expr, $component:expr, $opts:expr $(,)?) => {
        $profile.watch($component, $opts)
    };
}

/// Raises a formatted string payload out of a method body.
///
/// Expands to an early `return` with a [`Thrown`](crate::Thrown) string
/// value, so it only fits inside functions returning
/// [`CallResult`](crate::CallResult).
#[macro_export]
macro_rules! raise {
    ($($arg:tt)*) => {
        return Err($crate::Thrown::text(format!($($arg)*)))
    };
}
