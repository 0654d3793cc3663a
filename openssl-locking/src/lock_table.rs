use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;
use std::fmt;
use std::io::{self, Write};
use std::process;

/// One raw mutex per lock index the library asked for.
///
/// The library acquires and releases a slot in two separate callback
/// invocations, so there is no guard object to hold on to; slots are locked
/// and unlocked explicitly.
pub(crate) struct LockTable {
    locks: Box<[RawMutex]>,
}

impl LockTable {
    pub fn new(size: usize) -> LockTable {
        LockTable {
            locks: (0..size).map(|_| RawMutex::INIT).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Blocks until the calling thread owns lock `n`.
    pub fn acquire(&self, n: usize) {
        self.slot(n).lock();
    }

    /// Releases lock `n`, which the calling thread must hold.
    pub fn release(&self, n: usize) {
        let lock = self.slot(n);
        if !lock.is_locked() {
            bug(format_args!("lock {} already unlocked", n));
        }
        unsafe {
            lock.unlock();
        }
    }

    #[cfg(test)]
    pub fn is_locked(&self, n: usize) -> bool {
        self.slot(n).is_locked()
    }

    fn slot(&self, n: usize) -> &RawMutex {
        match self.locks.get(n) {
            Some(lock) => lock,
            None => bug(format_args!("lock {} out of range for {} locks", n, self.len())),
        }
    }
}

impl fmt::Debug for LockTable {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("LockTable")
            .field("len", &self.len())
            .finish()
    }
}

/// Reports a broken locking contract and aborts; the caller is an FFI frame
/// that cannot be unwound through.
pub(crate) fn bug(msg: fmt::Arguments) -> ! {
    let _ = writeln!(io::stderr(), "BUG: openssl-locking {}, aborting", msg);
    process::abort();
}

/// Runs `body` in a child copy of the test binary and asserts that it aborts
/// with a `BUG:` report. `test` is the full path of the calling test.
#[cfg(test)]
pub(crate) fn assert_aborts<F: FnOnce()>(test: &str, body: F) {
    use std::env;
    use std::process::Command;

    const CHILD: &str = "OPENSSL_LOCKING_ABORT_CHILD";

    if env::var_os(CHILD).is_some() {
        body();
        return;
    }

    let output = Command::new(env::current_exe().unwrap())
        .args([test, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD, "1")
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "{} did not abort: {}", test, stderr);
    assert!(stderr.contains("BUG: openssl-locking"), "{}", stderr);
}
