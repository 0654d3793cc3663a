#![allow(dead_code)]

use libc::{c_char, c_int, c_long, c_ulong};
use openssl_locking::{
    LockingCallback, Registry, ServerNameCallback, ThreadIdCallback, CRYPTO_LOCK, CRYPTO_UNLOCK,
    CRYPTO_WRITE,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const FILE: &[u8] = b"tests/common/mod.rs\0";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A library stand-in that records what is registered with it.
pub struct RecordingRegistry {
    num_locks: AtomicUsize,
    locking: Mutex<Option<LockingCallback>>,
    id: Mutex<Option<ThreadIdCallback>>,
    locking_registrations: AtomicUsize,
    servername_status: c_long,
    servername_calls: Mutex<Vec<(usize, Option<usize>)>>,
}

impl RecordingRegistry {
    pub fn new(num_locks: usize) -> RecordingRegistry {
        RecordingRegistry {
            num_locks: AtomicUsize::new(num_locks),
            locking: Mutex::new(None),
            id: Mutex::new(None),
            locking_registrations: AtomicUsize::new(0),
            servername_status: 1,
            servername_calls: Mutex::new(vec![]),
        }
    }

    pub fn with_servername_status(mut self, status: c_long) -> RecordingRegistry {
        self.servername_status = status;
        self
    }

    /// Changes the lock count reported from now on.
    pub fn set_num_locks(&self, num_locks: usize) {
        self.num_locks.store(num_locks, Ordering::SeqCst);
    }

    pub fn registered_locking(&self) -> Option<LockingCallback> {
        *self.locking.lock()
    }

    pub fn registered_id(&self) -> Option<ThreadIdCallback> {
        *self.id.lock()
    }

    /// Number of times a non-null locking callback was registered.
    pub fn locking_registrations(&self) -> usize {
        self.locking_registrations.load(Ordering::SeqCst)
    }

    /// `(ctx, callback)` addresses of every server name registration.
    pub fn servername_calls(&self) -> Vec<(usize, Option<usize>)> {
        self.servername_calls.lock().clone()
    }

    /// The registered locking callback, as the library would see it.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher(self.registered_locking().expect("no locking callback registered"))
    }

    /// Calls the registered id callback, as the library would.
    pub fn thread_id(&self) -> c_ulong {
        let callback = self.registered_id().expect("no id callback registered");
        unsafe { callback() }
    }
}

impl Registry for RecordingRegistry {
    fn num_locks(&self) -> usize {
        self.num_locks.load(Ordering::SeqCst)
    }

    fn locking_callback(&self) -> Option<LockingCallback> {
        self.registered_locking()
    }

    fn set_locking_callback(&self, callback: Option<LockingCallback>) {
        if callback.is_some() {
            self.locking_registrations.fetch_add(1, Ordering::SeqCst);
        }
        *self.locking.lock() = callback;
    }

    fn set_id_callback(&self, callback: Option<ThreadIdCallback>) {
        *self.id.lock() = callback;
    }

    unsafe fn set_servername_callback(
        &self,
        ctx: *mut ffi::SSL_CTX,
        callback: Option<ServerNameCallback>,
    ) -> c_long {
        self.servername_calls
            .lock()
            .push((ctx as usize, callback.map(|f| f as usize)));
        self.servername_status
    }
}

/// A registered locking callback, invoked the way the library invokes it.
#[derive(Clone, Copy)]
pub struct Dispatcher(LockingCallback);

impl Dispatcher {
    pub fn lock(&self, n: c_int) {
        self.call(CRYPTO_LOCK | CRYPTO_WRITE, n);
    }

    pub fn unlock(&self, n: c_int) {
        self.call(CRYPTO_UNLOCK | CRYPTO_WRITE, n);
    }

    fn call(&self, mode: c_int, n: c_int) {
        let file = FILE.as_ptr() as *const c_char;
        unsafe { (self.0)(mode, n, file, line!() as c_int) }
    }
}
