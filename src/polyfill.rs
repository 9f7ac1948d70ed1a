//! A polyfill over some alloc crate pieces of functionality.

use core::alloc::Layout;

/// Signals an allocation failure which the caller cannot report, typically by aborting.
#[cold]
pub(crate) fn handle_alloc_error(layout: Layout) -> ! {
    log::error!("allocation of {} bytes, aligned on {}, failed", layout.size(), layout.align());

    implementation::handle_alloc_error(layout)
}

#[cfg(feature = "alloc")]
mod implementation {
    pub use alloc::alloc::handle_alloc_error;
} // mod implementation

#[cfg(not(feature = "alloc"))]
mod implementation {
    use core::alloc::Layout;

    pub const fn handle_alloc_error(_layout: Layout) -> ! {
        panic!("allocation failed")
    }
} // mod implementation
