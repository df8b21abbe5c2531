use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::{
    error::{AerofnError, AerofnResult},
    param::Parameter,
};

/// The shared simulation property namespace: slash-delimited paths mapped to
/// double-valued slots.
///
/// A slot either stores a plain value (written with [`PropertyManager::set`])
/// or is bound to a read-only accessor that computes the value on every read
/// (a published [`crate::Function`]). Same-thread only; concurrent access
/// needs external synchronization.
#[derive(Default)]
pub struct PropertyManager {
    slots: RefCell<BTreeMap<String, Rc<Slot>>>,
}

enum SlotKind {
    Value(f64),
    Bound(Rc<dyn Parameter>),
}

pub(crate) struct Slot(RefCell<SlotKind>);

/// A path resolved once against the namespace. Reads always see the slot's
/// current state, including a later `bind` on the same path.
#[derive(Clone)]
pub struct PropertyHandle {
    path: Rc<str>,
    slot: Rc<Slot>,
}

impl PropertyHandle {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self) -> f64 {
        let bound = match &*self.slot.0.borrow() {
            SlotKind::Value(v) => return *v,
            // Clone out and release the borrow: the accessor may read other
            // properties while evaluating.
            SlotKind::Bound(p) => Rc::clone(p),
        };
        bound.value()
    }

    pub fn is_bound(&self) -> bool {
        matches!(&*self.slot.0.borrow(), SlotKind::Bound(_))
    }

    pub fn set(&self, value: f64) -> AerofnResult<()> {
        let mut kind = self.slot.0.borrow_mut();
        match &*kind {
            SlotKind::Value(_) => {
                *kind = SlotKind::Value(value);
                Ok(())
            }
            SlotKind::Bound(_) => Err(AerofnError::property(format!(
                "property '{}' is bound to a function and is read-only",
                self.path
            ))),
        }
    }
}

impl PropertyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.slots.borrow().contains_key(path)
    }

    /// Resolves an existing path. Unknown paths are an error: a property
    /// referenced by a function must exist before the function is built.
    pub fn resolve(&self, path: &str) -> AerofnResult<PropertyHandle> {
        let slots = self.slots.borrow();
        let slot = slots
            .get(path)
            .ok_or_else(|| AerofnError::property(format!("unknown property path '{path}'")))?;
        Ok(PropertyHandle {
            path: Rc::from(path),
            slot: Rc::clone(slot),
        })
    }

    /// Resolves a path, creating a zero-valued slot if it does not exist yet.
    pub fn resolve_or_create(&self, path: &str) -> AerofnResult<PropertyHandle> {
        let path = validated(path)?;
        let mut slots = self.slots.borrow_mut();
        let slot = slots
            .entry(path.to_string())
            .or_insert_with(|| Rc::new(Slot(RefCell::new(SlotKind::Value(0.0)))));
        Ok(PropertyHandle {
            path: Rc::from(path),
            slot: Rc::clone(slot),
        })
    }

    pub fn get(&self, path: &str) -> AerofnResult<f64> {
        Ok(self.resolve(path)?.get())
    }

    /// Writes a value, creating the slot if needed. Writing to a bound path
    /// is an error.
    pub fn set(&self, path: &str, value: f64) -> AerofnResult<()> {
        self.resolve_or_create(path)?.set(value)
    }

    /// Registers a read-only accessor under `path`. The accessor is shared:
    /// it stays reachable through the namespace for as long as it is bound.
    /// Re-binding an already-bound path is an error.
    pub fn bind(&self, path: &str, accessor: Rc<dyn Parameter>) -> AerofnResult<()> {
        let path = validated(path)?;
        let mut slots = self.slots.borrow_mut();
        if let Some(slot) = slots.get(path) {
            let mut kind = slot.0.borrow_mut();
            match &*kind {
                SlotKind::Bound(_) => {
                    return Err(AerofnError::property(format!(
                        "property '{path}' is already bound"
                    )));
                }
                // Upgrade in place so previously resolved handles observe
                // the binding.
                SlotKind::Value(_) => *kind = SlotKind::Bound(accessor),
            }
        } else {
            slots.insert(
                path.to_string(),
                Rc::new(Slot(RefCell::new(SlotKind::Bound(accessor)))),
            );
        }
        Ok(())
    }

    /// Removes a binding, freezing the slot at the accessor's final value.
    /// Returns false if the path was not bound.
    pub fn unbind(&self, path: &str) -> bool {
        let slots = self.slots.borrow();
        let Some(slot) = slots.get(path) else {
            return false;
        };
        let accessor = match &*slot.0.borrow() {
            SlotKind::Value(_) => return false,
            SlotKind::Bound(p) => Rc::clone(p),
        };
        let last = accessor.value();
        *slot.0.borrow_mut() = SlotKind::Value(last);
        true
    }
}

fn validated(path: &str) -> AerofnResult<&str> {
    if path.trim().is_empty() {
        return Err(AerofnError::property("empty property path"));
    }
    Ok(path)
}
