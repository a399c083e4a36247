//! # Register State
//!
//! The one shared [`Register`] behind a lock.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Who Holds the Lock                              │
//! │                                                                         │
//! │  RegisterService (local actions)        SyncAgent (remote folds)        │
//! │  ──────────────────────────────         ─────────────────────────       │
//! │  add_to_cart, checkout, admin ops       initial pull snapshots          │
//! │  via with_register(_mut)                per-event fold rules            │
//! │                                                                         │
//! │            └──────── Arc<Mutex<Register>> ────────┘                     │
//! │                                                                         │
//! │  Every critical section is a short, non-blocking pure transition on    │
//! │  in-memory state. Nothing awaits while holding the lock, so a plain    │
//! │  std Mutex is the right tool even inside async tasks.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use snack_core::Register;

/// Shared handle to the register state.
#[derive(Debug, Clone)]
pub struct RegisterState {
    register: Arc<Mutex<Register>>,
}

impl RegisterState {
    /// Wraps a register for sharing.
    pub fn new(register: Register) -> Self {
        RegisterState {
            register: Arc::new(Mutex::new(register)),
        }
    }

    /// Executes a function with read access to the register.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = state.with_register(|r| r.cart_total());
    /// ```
    pub fn with_register<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Register) -> R,
    {
        let register = self.register.lock().expect("Register mutex poisoned");
        f(&register)
    }

    /// Executes a function with write access to the register.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_register_mut(|r| r.add_to_cart("chips", Some("Hot Cheetos")))?;
    /// ```
    pub fn with_register_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Register) -> R,
    {
        let mut register = self.register.lock().expect("Register mutex poisoned");
        f(&mut register)
    }

    /// The raw shared handle, for wiring up the sync agent.
    pub fn shared(&self) -> Arc<Mutex<Register>> {
        self.register.clone()
    }
}

impl Default for RegisterState {
    fn default() -> Self {
        Self::new(Register::new())
    }
}
