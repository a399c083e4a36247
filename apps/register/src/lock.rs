//! # Screen Lock
//!
//! PIN gate in front of the admin screen.
//!
//! ## What This Protects
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Screen Lock Scope                                │
//! │                                                                         │
//! │  UNGATED (selling must never stop)     GATED (admin screen)            │
//! │  ─────────────────────────────────     ─────────────────────           │
//! │  add_to_cart / remove / clear          add_item                        │
//! │  checkout / fulfill / cancel           adjust_stock                    │
//! │  history / earnings views              reset_history                   │
//! │                                                                         │
//! │  The lock keeps helpful younger siblings from "restocking" the         │
//! │  stand. It is not a security boundary; the PIN lives in plain          │
//! │  text in the config file.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// PIN-gated unlock state for the admin screen.
///
/// Interior mutability so the service can hold it behind `&self`; the
/// lock state is a single flag flipped from whichever task handles the
/// unlock attempt.
#[derive(Debug)]
pub struct ScreenLock {
    pin: String,
    unlocked: AtomicBool,
}

impl ScreenLock {
    /// Creates a lock that starts locked.
    pub fn new(pin: impl Into<String>) -> Self {
        ScreenLock {
            pin: pin.into(),
            unlocked: AtomicBool::new(false),
        }
    }

    /// Attempts to unlock with the given PIN. Returns whether the
    /// screen is now unlocked.
    pub fn unlock(&self, attempt: &str) -> bool {
        if attempt == self.pin {
            self.unlocked.store(true, Ordering::SeqCst);
            info!("Admin screen unlocked");
            true
        } else {
            warn!("Admin unlock attempt with wrong PIN");
            false
        }
    }

    /// Locks the admin screen again.
    pub fn lock(&self) {
        self.unlocked.store(false, Ordering::SeqCst);
        info!("Admin screen locked");
    }

    /// True while the admin screen is unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }
}
