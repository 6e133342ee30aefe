//! Watchable components: dynamic records of named methods over shared state.
//!
//! Languages with ambient reflection enumerate an object's callable members
//! directly; here the registration list is explicit. A [`Component`] holds
//! plain data fields as a [`Value`], named [`Method`] slots, an optional
//! callable slot (a component that can itself be invoked, with or without
//! "static" members), and an optional parent forming a resolution chain that
//! deep watching walks.
//!
//! `Component` is a cheap handle: clones alias the same underlying record,
//! which is what gives member wrapping its in-place guarantee — every holder
//! of the handle observes the wrapped methods.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::thrown::{Thrown, Value};

/// Outcome of invoking a watched or unwatched method.
pub type CallResult = Result<Value, Thrown>;

/// A method body: receiver handle plus argument list.
///
/// The receiver is the component the call was dispatched through, so method
/// bodies reach their own state and sibling methods the way `this` would.
pub type MethodFn = dyn Fn(&Component, &[Value]) -> CallResult;

/// Shared, cheaply-cloned method.
pub type Method = Rc<MethodFn>;

#[derive(Clone)]
pub(crate) struct Slot {
    pub(crate) method: Method,
    pub(crate) writable: bool,
}

struct Inner {
    state: Value,
    slots: BTreeMap<String, Slot>,
    callable: Option<Slot>,
    parent: Option<Component>,
}

/// Handle to a watchable component.
#[derive(Clone)]
pub struct Component {
    inner: Rc<RefCell<Inner>>,
}

impl Component {
    fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// An empty, non-callable component with no state.
    pub fn new() -> Self {
        Self::object(Value::Null)
    }

    /// A plain record carrying `state` as its data fields.
    pub fn object(state: Value) -> Self {
        Self::from_inner(Inner {
            state,
            slots: BTreeMap::new(),
            callable: None,
            parent: None,
        })
    }

    /// A callable component; member slots can still be added on top for the
    /// function-with-static-members shape.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Component, &[Value]) -> CallResult + 'static,
    {
        Self::from_method(Rc::new(f))
    }

    pub(crate) fn from_method(method: Method) -> Self {
        Self::from_inner(Inner {
            state: Value::Null,
            slots: BTreeMap::new(),
            callable: Some(Slot {
                method,
                writable: true,
            }),
            parent: None,
        })
    }

    /// Adds a named method; chainable.
    pub fn method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Component, &[Value]) -> CallResult + 'static,
    {
        self.inner.borrow_mut().slots.insert(
            name.into(),
            Slot {
                method: Rc::new(f),
                writable: true,
            },
        );
        self
    }

    /// Adds a method whose slot can never be replaced, wrapping included.
    pub fn sealed_method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Component, &[Value]) -> CallResult + 'static,
    {
        self.inner.borrow_mut().slots.insert(
            name.into(),
            Slot {
                method: Rc::new(f),
                writable: false,
            },
        );
        self
    }

    /// Links a parent for member resolution; chainable.
    pub fn parent(self, parent: Component) -> Self {
        self.inner.borrow_mut().parent = Some(parent);
        self
    }

    /// Marks an own member as non-replaceable.
    pub fn seal(&self, name: &str) {
        if let Some(slot) = self.inner.borrow_mut().slots.get_mut(name) {
            slot.writable = false;
        }
    }

    /// True when the component can itself be invoked.
    #[inline]
    pub fn is_callable(&self) -> bool {
        self.inner.borrow().callable.is_some()
    }

    /// Invokes the component itself.
    pub fn invoke(&self, args: &[Value]) -> CallResult {
        let slot = self.inner.borrow().callable.clone();
        match slot {
            Some(slot) => (slot.method)(self, args),
            None => Err(Thrown::text("component is not callable")),
        }
    }

    /// Dispatches a member call, resolving through the parent chain.
    pub fn call(&self, name: &str, args: &[Value]) -> CallResult {
        match self.find(name) {
            Some(slot) => (slot.method)(self, args),
            None => Err(Thrown::text(format!("no such member: {name}"))),
        }
    }

    /// Names of members defined directly on this component.
    pub fn own_members(&self) -> Vec<String> {
        self.inner.borrow().slots.keys().cloned().collect()
    }

    /// Names of members reachable through the whole resolution chain, own
    /// members first, shadowed names listed once.
    pub fn members(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = Some(self.clone());
        while let Some(component) = cursor {
            let inner = component.inner.borrow();
            for name in inner.slots.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            cursor = inner.parent.clone();
        }
        names
    }

    /// Whether a member slot may be replaced; resolves through the chain,
    /// `false` for unknown members.
    pub fn is_writable(&self, name: &str) -> bool {
        self.find(name).map(|slot| slot.writable).unwrap_or(false)
    }

    /// Snapshot of the data fields.
    pub fn state(&self) -> Value {
        self.inner.borrow().state.clone()
    }

    /// Replaces the data fields wholesale.
    pub fn set_state(&self, state: Value) {
        self.inner.borrow_mut().state = state;
    }

    /// Runs `f` over a borrowed view of the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.borrow().state)
    }

    /// Runs `f` over a mutable view of the state. The borrow lasts only for
    /// the closure, so methods stay free to call back into the component.
    pub fn with_state_mut<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.inner.borrow_mut().state)
    }

    /// Reads one data field of an object-shaped state.
    pub fn field(&self, key: &str) -> Option<Value> {
        self.inner.borrow().state.get(key).cloned()
    }

    /// Writes one data field, turning a non-object state into an object.
    pub fn set_field(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut inner = self.inner.borrow_mut();
        if !inner.state.is_object() {
            inner.state = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(fields) = &mut inner.state {
            fields.insert(key.into(), value.into());
        }
    }

    /// True when both handles alias the same component.
    #[inline]
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn find(&self, name: &str) -> Option<Slot> {
        let mut cursor = Some(self.clone());
        while let Some(component) = cursor {
            let inner = component.inner.borrow();
            if let Some(slot) = inner.slots.get(name) {
                return Some(slot.clone());
            }
            cursor = inner.parent.clone();
        }
        None
    }

    pub(crate) fn callable_slot(&self) -> Option<Slot> {
        self.inner.borrow().callable.clone()
    }

    /// Installs a slot directly on this component, shadowing any inherited
    /// member of the same name.
    pub(crate) fn install(&self, name: &str, method: Method) {
        self.inner.borrow_mut().slots.insert(
            name.to_string(),
            Slot {
                method,
                writable: true,
            },
        );
    }

    pub(crate) fn downgrade(&self) -> WeakComponent {
        WeakComponent {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Component")
            .field("callable", &inner.callable.is_some())
            .field("members", &inner.slots.keys().collect::<Vec<_>>())
            .field("has_parent", &inner.parent.is_some())
            .finish_non_exhaustive()
    }
}

/// Weak back-reference held by interception closures, so wrapping a member
/// never creates a reference cycle through its own component.
pub(crate) struct WeakComponent {
    inner: Weak<RefCell<Inner>>,
}

impl WeakComponent {
    pub(crate) fn upgrade(&self) -> Option<Component> {
        self.inner.upgrade().map(|inner| Component { inner })
    }
}
