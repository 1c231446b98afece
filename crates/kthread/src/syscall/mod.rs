//! 系统调用
//!
//! 每个系统调用都显式接收当前线程 `curr`。会阻塞的系统调用是 async 的，
//! 只在 `.await` 处让出控制权

mod fs;
mod process;
mod thread;

pub use self::{fs::*, process::*, thread::*};
