use std::ptr::NonNull;

/// Entry point to the platform's virtual memory interface.
///
/// The pool region is requested from the operating system directly (`mmap`
/// on unix, `VirtualAlloc` on windows) rather than from the process heap, so
/// the pool never competes with the allocations it hands out.
pub(crate) struct Kernel;

/// This trait provides an abstraction to handle low level memory operations
/// and syscalls, as the pool itself has nothing to do with the concrete
/// APIs offered by each kernel.
trait PlatformMemory {
    /// Requests a memory region of size `len`. Returns a pointer to the
    /// region, or `None` if the underlying syscall fails.
    unsafe fn request_memory(len: usize) -> Option<NonNull<u8>>;

    /// Returns the memory of size `len` starting at `addr` back to the kernel.
    unsafe fn return_memory(addr: *mut u8, len: usize);
}

/// Wrapper to use [`Kernel::request_memory`]
#[inline]
pub(crate) unsafe fn request_memory(len: usize) -> Option<NonNull<u8>> {
    unsafe { Kernel::request_memory(len) }
}

/// Wrapper to use [`Kernel::return_memory`]
#[inline]
pub(crate) unsafe fn return_memory(addr: *mut u8, len: usize) {
    unsafe { Kernel::return_memory(addr, len) }
}

#[cfg(unix)]
mod unix {
    use super::{Kernel, PlatformMemory};

    use libc::{mmap, munmap, size_t};

    use std::{
        os::raw::{c_int, c_void},
        ptr::NonNull,
    };

    impl PlatformMemory for Kernel {
        unsafe fn request_memory(len: usize) -> Option<NonNull<u8>> {
            // Fresh private pages, read-write, not backed by any file.
            const PROT: c_int = libc::PROT_READ | libc::PROT_WRITE;
            const FLAGS: c_int = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

            unsafe {
                let addr = mmap(std::ptr::null_mut(), len as size_t, PROT, FLAGS, -1, 0);

                if addr == libc::MAP_FAILED {
                    None
                } else {
                    Some(NonNull::new_unchecked(addr).cast::<u8>())
                }
            }
        }

        unsafe fn return_memory(addr: *mut u8, len: usize) {
            unsafe {
                munmap(addr as *mut c_void, len as size_t);
            }
        }
    }
}

#[cfg(windows)]
mod windows {
    use std::{os::raw::c_void, ptr::NonNull};

    use windows::Win32::System::Memory;

    use super::{Kernel, PlatformMemory};

    impl PlatformMemory for Kernel {
        unsafe fn request_memory(len: usize) -> Option<NonNull<u8>> {
            let flags = Memory::MEM_RESERVE | Memory::MEM_COMMIT;

            unsafe {
                let addr = Memory::VirtualAlloc(None, len, flags, Memory::PAGE_READWRITE);

                NonNull::new(addr.cast())
            }
        }

        unsafe fn return_memory(addr: *mut u8, _len: usize) {
            unsafe {
                let _ = Memory::VirtualFree(addr as *mut c_void, 0, Memory::MEM_RELEASE);
            }
        }
    }
}
