use std::marker::PhantomData;

use anyhow::{Context, Result};
use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Com::{COINIT_MULTITHREADED, CoInitializeEx, CoUninitialize};

/// Per-thread COM initialization, undone on drop
///
/// Not `Send`: an apartment belongs to the thread that entered it.
pub struct ComGuard {
    owns_init: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl ComGuard {
    /// Enter the multithreaded apartment. A thread that already joined a
    /// different apartment is used as is and left alone on drop.
    pub fn initialize() -> Result<Self> {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            tracing::debug!("COM already initialized with another apartment model");
            return Ok(Self {
                owns_init: false,
                _thread_bound: PhantomData,
            });
        }
        hr.ok().context("Failed to initialize COM")?;

        Ok(Self {
            owns_init: true,
            _thread_bound: PhantomData,
        })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.owns_init {
            unsafe { CoUninitialize() };
        }
    }
}
