#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod kspin;

pub use kspin::{SpinMutex, SpinMutexGuard};
pub use spin::{Lazy, Once};
