//! 教学内核的线程生命周期核心
//!
//! 用户线程的创建、自我标识、join、detach 与退出，以及进程最后一个线程退出时的
//! 进程清理（子进程过继给 initproc、通知父进程、释放资源）。
//!
//! 每个用户线程都是执行器上的一个 future，只会在 `.await` 处让出控制权。
//! 系统调用显式接收当前线程 `curr: &Arc<Thread>`，而不是从全局的 hart 状态中取。
//!
//! ```ignore
//! let kernel = Kernel::new();
//! kernel.boot(Some(Task::new(|curr, _, _| async move {
//!     let tid = syscall::sys_create_thread(&curr, Some(child_task), 0, None).unwrap();
//!     let mut value = 0;
//!     syscall::sys_thread_join(&curr, tid, Some(&mut value)).await.unwrap();
//!     value
//! })), 0, None)?;
//! kernel.run_until_idle();
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;
#[macro_use]
extern crate kernel_tracer;

pub mod fs;
mod kernel;
pub mod process;
pub mod syscall;
pub mod thread;

pub use defines::error::{errno, Error, KResult};
pub use kernel::Kernel;
pub use process::{Pid, Process};
pub use thread::{Task, Thread, ThreadStatus, Tid, NOTHREAD};
