use std::cell::Cell;

use log::{trace, warn};

use super::{Tape, TapeMark};

thread_local! {
    static TAPE: Cell<*mut Tape> = const { Cell::new(std::ptr::null_mut()) };
}

/// Access the active tape for the current thread. Panics if no tape is active.
///
/// Must not be called re-entrantly from inside `f`.
#[inline]
pub fn with_active_tape<R>(f: impl FnOnce(&mut Tape) -> R) -> R {
    TAPE.with(|cell| {
        let ptr = cell.get();
        assert!(
            !ptr.is_null(),
            "No active tape. Use revmat::grad() or activate one with TapeGuard."
        );
        // SAFETY: The TapeGuard guarantees the pointer is valid for the
        // duration of the scope, and only one mutable reference exists at a
        // time (single-threaded access via thread-local).
        let tape = unsafe { &mut *ptr };
        f(tape)
    })
}

/// Like [`with_active_tape`], but returns `None` when no tape is active.
#[inline]
pub fn try_with_active_tape<R>(f: impl FnOnce(&mut Tape) -> R) -> Option<R> {
    TAPE.with(|cell| {
        let ptr = cell.get();
        if ptr.is_null() {
            return None;
        }
        // SAFETY: see `with_active_tape`.
        let tape = unsafe { &mut *ptr };
        Some(f(tape))
    })
}

/// Whether a tape is active on this thread.
pub fn is_active() -> bool {
    !active_ptr().is_null()
}

fn active_ptr() -> *mut Tape {
    TAPE.with(|cell| cell.get())
}

/// RAII guard that sets a tape as the thread-local active tape and restores
/// the previous one on drop.
pub struct TapeGuard {
    prev: *mut Tape,
}

impl TapeGuard {
    /// Activate `tape` as the thread-local tape. Returns a guard that restores
    /// the previous tape on drop.
    pub fn new(tape: &mut Tape) -> Self {
        let prev = TAPE.with(|cell| {
            let prev = cell.get();
            cell.set(tape as *mut Tape);
            prev
        });
        TapeGuard { prev }
    }
}

impl Drop for TapeGuard {
    fn drop(&mut self) {
        TAPE.with(|cell| {
            cell.set(self.prev);
        });
    }
}

/// RAII nested scope on the active tape.
///
/// Snapshots the active tape on creation and truncates it back on drop, so a
/// sub-computation can record and sweep its own nodes without disturbing the
/// enclosing graph. `Var`s created inside the scope are invalid after it ends.
///
/// Only the tape the scope was entered on is rolled back. If a different tape
/// is active when the scope ends, nothing is truncated.
pub struct Nested {
    tape: *mut Tape,
    mark: TapeMark,
}

impl Nested {
    /// Enter a nested scope on the active tape. Panics if no tape is active.
    pub fn enter() -> Self {
        let mark = with_active_tape(|t| t.mark());
        trace!("entering nested scope at {} nodes", mark.nodes());
        Nested {
            tape: active_ptr(),
            mark,
        }
    }

    /// The position the scope will roll back to.
    pub fn mark(&self) -> TapeMark {
        self.mark
    }
}

impl Drop for Nested {
    fn drop(&mut self) {
        let active = active_ptr();
        if active != self.tape {
            warn!("nested scope ended while another tape was active; not rolled back");
            return;
        }
        // SAFETY: the pointer is the active tape, kept valid by its TapeGuard.
        let tape = unsafe { &mut *active };
        tape.truncate(self.mark);
    }
}
