//! Locking callbacks for OpenSSL releases that are not internally thread-safe.
//!
//! Before 1.1.0, OpenSSL protected its shared structures by calling back into
//! the application: a locking callback to acquire or release one of
//! `CRYPTO_num_locks()` locks, and an id callback to tell threads apart. This
//! module owns the process-wide lock table behind those callbacks.
//!
//! ```no_run
//! use openssl_locking::threading;
//!
//! threading::init();
//! assert!(threading::is_installed());
//! // ... use OpenSSL from any number of threads ...
//! threading::teardown();
//! ```
//!
//! [`init`] and [`teardown`] are idempotent. Against OpenSSL 1.1.0 and newer
//! they still manage a (single entry) lock table, but the library never calls
//! into it.

use libc::{c_char, c_int, c_ulong};
use log::{debug, info};
use parking_lot::{const_mutex, Mutex};
use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::legacy::CRYPTO_LOCK;
use crate::lock_table::{bug, LockTable};
use crate::registry::{OpenSsl, Registry};
use crate::thread_id;


static LOCKS: AtomicPtr<LockTable> = AtomicPtr::new(ptr::null_mut());

// Serializes install and removal of LOCKS and counts installs, so the value
// names the table currently in LOCKS. The callbacks never take it.
static LIFECYCLE: Mutex<u64> = const_mutex(0);

/// The locking callback registered with the library.
///
/// Acquires lock `n` when `mode` has `CRYPTO_LOCK` set and releases it
/// otherwise. `file` and `line` are ignored.
///
/// An index outside the installed table, a release of a lock that is not held,
/// or a call while no table is installed aborts the process.
///
/// # Safety
///
/// Must only be invoked by the library (or on its behalf) while the callbacks
/// are installed, with every release matching an earlier acquire on the same
/// thread.
pub unsafe extern "C" fn locking_callback(
    mode: c_int,
    n: c_int,
    _file: *const c_char,
    _line: c_int,
) {
    let table = LOCKS.load(Ordering::Acquire);
    if table.is_null() {
        bug(format_args!("lock {} requested with no lock table installed", n));
    }
    let table = &*table;

    let n = match usize::try_from(n) {
        Ok(n) => n,
        Err(_) => bug(format_args!("negative lock index {}", n)),
    };

    if mode & CRYPTO_LOCK != 0 {
        table.acquire(n);
    } else {
        table.release(n);
    }
}

/// The thread id callback registered with the library.
///
/// # Safety
///
/// Always safe to call; it is `unsafe` only to match the library's callback
/// type.
pub unsafe extern "C" fn thread_id_callback() -> c_ulong {
    thread_id::current()
}

/// Installs the locking callbacks into the linked OpenSSL.
///
/// Does nothing if a locking callback is already registered, whether by this
/// crate or by anyone else.
pub fn init() {
    init_with(&OpenSsl);
}

/// Installs the locking callbacks into `registry`.
///
/// Allocates a lock table of `registry.num_locks()` entries, then registers
/// [`thread_id_callback`] and [`locking_callback`]. Does nothing if the lock
/// table already exists or `registry` already has a locking callback.
pub fn init_with<R: Registry + ?Sized>(registry: &R) {
    install(registry);
}

/// Removes the locking callbacks from the linked OpenSSL and frees the lock
/// table. Does nothing if the table was never installed.
pub fn teardown() {
    teardown_with(&OpenSsl);
}

/// Unregisters both callbacks from `registry` and frees the lock table.
///
/// Does nothing if the lock table does not exist.
pub fn teardown_with<R: Registry + ?Sized>(registry: &R) {
    let _guard = LIFECYCLE.lock();
    remove(registry);
}

/// Tears down the lock table only if it is still the one `generation` names.
fn teardown_generation<R: Registry + ?Sized>(registry: &R, generation: u64) {
    let guard = LIFECYCLE.lock();

    if *guard != generation || !is_installed() {
        debug!(
            "lock table {} already removed, leaving the current one in place",
            generation
        );
        return;
    }
    remove(registry);
}

// Callers hold LIFECYCLE.
fn remove<R: Registry + ?Sized>(registry: &R) {
    let table = LOCKS.load(Ordering::Acquire);
    if table.is_null() {
        debug!("no lock table installed, nothing to tear down");
        return;
    }

    registry.set_id_callback(None);
    registry.set_locking_callback(None);
    LOCKS.store(ptr::null_mut(), Ordering::Release);

    let table = unsafe { Box::from_raw(table) };
    info!("removed locking callbacks and {} locks", table.len());
}

/// Determines if the lock table is currently installed.
pub fn is_installed() -> bool {
    !LOCKS.load(Ordering::Acquire).is_null()
}

/// Returns the size of the installed lock table.
pub fn lock_count() -> Option<usize> {
    let _guard = LIFECYCLE.lock();

    let table = LOCKS.load(Ordering::Acquire);
    if table.is_null() {
        None
    } else {
        Some(unsafe { (*table).len() })
    }
}

/// Returns the generation of the lock table if this call created it.
fn install<R: Registry + ?Sized>(registry: &R) -> Option<u64> {
    let mut guard = LIFECYCLE.lock();

    if !LOCKS.load(Ordering::Acquire).is_null() {
        debug!("lock table already installed");
        return None;
    }

    if registry.locking_callback().is_some() {
        debug!("a locking callback is already registered, leaving it in place");
        return None;
    }

    let num_locks = registry.num_locks();
    let table = Box::into_raw(Box::new(LockTable::new(num_locks)));
    LOCKS.store(table, Ordering::Release);

    registry.set_id_callback(Some(thread_id_callback));
    registry.set_locking_callback(Some(locking_callback));

    *guard += 1;
    info!("installed locking callbacks with {} locks", num_locks);
    Some(*guard)
}

/// A handle on the process-wide locking callbacks.
///
/// Construct one at startup with [`ThreadSafety::install`] and pass it to code
/// that must only run once the library is safe to use from several threads.
/// Dropping the handle removes the callbacks, but only if this handle was the
/// one that installed them and they have not been replaced since.
#[must_use = "dropping the handle removes the callbacks it installed"]
pub struct ThreadSafety<'a, R: Registry + ?Sized = OpenSsl> {
    registry: &'a R,
    generation: Option<u64>,
}

impl<'a, R: Registry + ?Sized> ThreadSafety<'a, R> {
    /// Installs the locking callbacks into `registry` (see [`init_with`]).
    pub fn install(registry: &'a R) -> ThreadSafety<'a, R> {
        let generation = install(registry);
        ThreadSafety {
            registry,
            generation,
        }
    }

    /// Determines if the installed lock table is the one this handle created.
    pub fn owns_lock_table(&self) -> bool {
        match self.generation {
            Some(generation) => *LIFECYCLE.lock() == generation && is_installed(),
            None => false,
        }
    }

    /// Determines if the library has a locking callback to rely on, either
    /// this crate's or one registered by someone else.
    pub fn is_ready(&self) -> bool {
        is_installed() || self.registry.locking_callback().is_some()
    }

    /// Returns the size of the installed lock table.
    pub fn lock_count(&self) -> Option<usize> {
        lock_count()
    }

    /// Removes the callbacks now instead of when the handle is dropped.
    pub fn uninstall(mut self) {
        self.release();
    }

    pub(crate) fn release(&mut self) {
        if let Some(generation) = self.generation.take() {
            teardown_generation(self.registry, generation);
        }
    }
}

impl<'a, R: Registry + ?Sized> fmt::Debug for ThreadSafety<'a, R> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("ThreadSafety")
            .field("generation", &self.generation)
            .field("lock_count", &lock_count())
            .finish()
    }
}

impl<'a, R: Registry + ?Sized> Drop for ThreadSafety<'a, R> {
    fn drop(&mut self) {
        self.release();
    }
}
