//! Process-wide OpenSSL bring-up and shutdown.

use log::{debug, info};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::legacy;
use crate::registry::OpenSsl;
use crate::threading::ThreadSafety;

static ACTIVE: AtomicBool = AtomicBool::new(false);
static OPENSSL: OpenSsl = OpenSsl;

/// An initialized OpenSSL, ready to be used from several threads.
///
/// At most one `Library` exists at a time. Dropping it runs the library's
/// cleanup routines and removes the locking callbacks it installed.
///
/// ```no_run
/// use openssl_locking::Library;
///
/// let library = Library::init().unwrap();
/// assert!(library.threading().is_ready());
/// library.shutdown();
/// ```
pub struct Library {
    threading: ThreadSafety<'static>,
}

impl Library {
    /// Initializes OpenSSL: error strings, algorithms, locking callbacks and
    /// the PRNG.
    pub fn init() -> Result<Library> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyInitialized);
        }

        match bring_up() {
            Ok(threading) => {
                info!("OpenSSL initialized");
                Ok(Library { threading })
            }
            Err(e) => {
                ACTIVE.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Returns the locking callbacks handle.
    pub fn threading(&self) -> &ThreadSafety<'static> {
        &self.threading
    }

    /// Shuts the library down; equivalent to dropping it.
    pub fn shutdown(self) {}
}

impl fmt::Debug for Library {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Library")
            .field("threading", &self.threading)
            .finish()
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        cleanup();
        self.threading.release();
        ACTIVE.store(false, Ordering::Release);
        info!("OpenSSL shut down");
    }
}

fn bring_up() -> Result<ThreadSafety<'static>> {
    start(load, seed, cleanup)
}

// Everything `load` set up is undone if a later step fails.
fn start(
    load: fn() -> Result<()>,
    seed: fn() -> Result<()>,
    cleanup: fn(),
) -> Result<ThreadSafety<'static>> {
    load()?;
    let threading = ThreadSafety::install(&OPENSSL);
    if let Err(e) = seed() {
        cleanup();
        drop(threading);
        return Err(e);
    }
    Ok(threading)
}

#[cfg(not(ossl110))]
fn load() -> Result<()> {
    unsafe {
        if legacy::SSL_library_init() != 1 {
            return Err(Error::Init(crate::error::ErrorStack::get()));
        }
        legacy::SSL_load_error_strings();
    }
    Ok(())
}

#[cfg(ossl110)]
fn load() -> Result<()> {
    ffi::init();
    Ok(())
}

fn seed() -> Result<()> {
    unsafe {
        legacy::RAND_poll();
        if legacy::RAND_status() != 1 {
            return Err(Error::Entropy);
        }
    }
    debug!("PRNG seeded");
    Ok(())
}

#[cfg(not(ossl110))]
fn cleanup() {
    unsafe {
        legacy::EVP_cleanup();
        legacy::CRYPTO_cleanup_all_ex_data();
        legacy::ERR_free_strings();
    }
}

// 1.1.0 frees its global state from an atexit handler.
#[cfg(ossl110)]
fn cleanup() {}
