//! The role-asymmetric store queue.
//!
//! Objects are kept as [`serde_json::Value`] so a single queue can carry
//! heterogeneous items: a string, a number and a map can follow each other and
//! come back out in the same order on the other side.
//!
//! Only a remote queue accepts [`StoreQueue::save`]; only a local queue yields
//! from [`StoreQueue::load`]. Both sides must perform the same number of
//! operations in the same order. That contract is not checked across the
//! process boundary, but loading past the end fails with
//! [`Error::QueueExhausted`] instead of returning a default.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::role::Role;

/// FIFO buffer of objects pending transfer.
#[derive(Debug, Clone)]
pub struct StoreQueue {
    role: Role,
    items: VecDeque<Value>,
    loaded: usize,
}

impl StoreQueue {
    /// Create an empty queue for `role`.
    #[must_use]
    pub const fn new(role: Role) -> Self {
        Self {
            role,
            items: VecDeque::new(),
            loaded: 0,
        }
    }

    /// Create a local queue pre-filled from a received payload.
    #[must_use]
    pub fn from_items(items: Vec<Value>) -> Self {
        Self {
            role: Role::Local,
            items: items.into(),
            loaded: 0,
        }
    }

    /// Role this queue enforces.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Append an object to the tail. Remote only.
    pub fn save<T: Serialize + ?Sized>(&mut self, obj: &T) -> Result<()> {
        if self.role != Role::Remote {
            return Err(Error::RoleViolation {
                operation: "save",
                role: self.role,
            });
        }
        self.items.push_back(serde_json::to_value(obj)?);
        Ok(())
    }

    /// Remove the head object and decode it as `T`. Local only.
    pub fn load<T: DeserializeOwned>(&mut self) -> Result<T> {
        let value = self.load_value()?;
        Ok(serde_json::from_value(value)?)
    }

    /// Remove the head object without decoding it. Local only.
    pub fn load_value(&mut self) -> Result<Value> {
        if self.role != Role::Local {
            return Err(Error::RoleViolation {
                operation: "load",
                role: self.role,
            });
        }
        let value = self.items.pop_front().ok_or(Error::QueueExhausted {
            loaded: self.loaded,
        })?;
        self.loaded += 1;
        Ok(value)
    }

    /// Objects still queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Objects handed out by `load` so far.
    #[must_use]
    pub const fn loaded(&self) -> usize {
        self.loaded
    }

    /// Borrow the queued objects in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Snapshot of the queued objects, used when writing the payload.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.iter().cloned().collect()
    }
}
