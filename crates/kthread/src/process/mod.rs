mod inner;
mod manager;

use alloc::{boxed::Box, collections::VecDeque, vec::Vec};
use core::mem;

use atomic::{Atomic, Ordering};
use defines::config::INITPROC_PID;
use event_listener::Event;
use hashbrown::HashMap;
use klocks::SpinMutex;
use triomphe::Arc;

pub use self::{inner::ProcessInner, manager::ProcessManager};
use crate::{fs::FdTable, kernel::Kernel};

pub type Pid = usize;

pub struct Process {
    pid: Pid,
    /// 子进程退出，或者有已退出的进程被过继过来时广播
    pub child_exit: Event,
    pub status: Atomic<ProcessStatus>,
    inner: SpinMutex<ProcessInner>,
}

impl Process {
    pub fn new(
        pid: Pid,
        parent: Option<Arc<Process>>,
        args: Option<Box<[u8]>>,
        fd_table: FdTable,
    ) -> Self {
        Self {
            pid,
            child_exit: Event::new(),
            status: Atomic::new(ProcessStatus::alive()),
            inner: SpinMutex::new(ProcessInner {
                parent,
                children: Vec::new(),
                exited_children: VecDeque::new(),
                args,
                fd_table,
                thread_records: HashMap::new(),
                live_thread_count: 0,
                main_thread: None,
            }),
        }
    }

    /// 锁 inner 然后进行操作，算是个快捷方法。尽量避免同时拿多个锁
    pub fn lock_inner_with<T>(&self, f: impl FnOnce(&mut ProcessInner) -> T) -> T {
        f(&mut self.inner.lock())
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn is_exited(&self) -> bool {
        self.status.load(Ordering::SeqCst).state() == ProcessStatus::EXITED
    }

    pub fn is_zombie(&self) -> bool {
        self.status.load(Ordering::SeqCst).state() == ProcessStatus::ZOMBIE
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.load(Ordering::SeqCst).exit_code()
    }

    /// 僵尸进程的退出码，其他状态下为 `None`
    pub fn zombie_exit_code(&self) -> Option<i32> {
        let status = self.status.load(Ordering::SeqCst);
        (status.state() == ProcessStatus::ZOMBIE)
            .then_some(status)
            .and_then(ProcessStatus::exit_code)
    }

    pub fn live_thread_count(&self) -> usize {
        self.lock_inner_with(|inner| inner.live_thread_count)
    }
}

/// 进程最后一个线程退出时清理进程，使其成为僵尸进程，等待父进程回收
///
/// 对每个进程只会发生一次。注意不会同时持有两个进程的锁
pub(crate) fn teardown(process: &Arc<Process>, kernel: &Kernel, exit_code: i32) {
    info!("all threads exit, process exits with code {exit_code}");
    process
        .status
        .store(ProcessStatus::exited(exit_code), Ordering::SeqCst);
    let is_initproc = process.pid() == INITPROC_PID;

    // 子进程交由 INITPROC 来处理。如果退出的就是 INITPROC，那么无处可交
    if !is_initproc {
        let (children, exited_children) = process.lock_inner_with(|inner| {
            (
                mem::take(&mut inner.children),
                mem::take(&mut inner.exited_children),
            )
        });
        let initproc = kernel.init_proc();
        for child in &children {
            child.lock_inner_with(|child_inner| child_inner.parent = Some(Arc::clone(&initproc)));
        }
        if !children.is_empty() {
            debug!("hand {} children over to initproc", children.len());
        }
        initproc.lock_inner_with(|initproc_inner| {
            initproc_inner.children.extend(children);
            initproc_inner.exited_children.extend(exited_children);
        });
        initproc.child_exit.notify(usize::MAX);
    }

    // 通知父进程自己退出了
    if let Some(parent) = process.lock_inner_with(|inner| inner.parent.take()) {
        parent.lock_inner_with(|parent_inner| {
            parent_inner.exited_children.push_back(Arc::clone(process));
        });
        parent.child_exit.notify(usize::MAX);
    }

    let (records, files, main_thread) = process.lock_inner_with(|inner| {
        inner.args = None;
        (
            mem::take(&mut inner.thread_records),
            inner.fd_table.release_all(),
            inner.main_thread.take(),
        )
    });
    debug!(
        "release {} thread records and {} files",
        records.len(),
        files.len()
    );
    // 在锁外释放，文件关闭时可能会访问本进程
    drop(records);
    drop(files);
    drop(main_thread);

    process
        .status
        .store(ProcessStatus::zombie(exit_code), Ordering::SeqCst);
    if is_initproc {
        info!("initproc exits, shutdown");
        kernel.set_shutdown();
    }
}

/// 标记一个进程的状态，其中低 32 位记录 exit code
///
/// 高 32 位的可能有如下几种：
/// - 0: 进程处于正常状态下
/// - 1: 进程正在清理
/// - 2: 进程资源已回收，成为僵尸等待父进程回收
#[derive(bytemuck::NoUninit, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ProcessStatus(u64);

impl ProcessStatus {
    const ALIVE: u64 = 0;
    const EXITED: u64 = 1;
    const ZOMBIE: u64 = 2;

    pub fn alive() -> Self {
        Self(Self::ALIVE << 32)
    }

    pub fn exited(exit_code: i32) -> Self {
        Self((Self::EXITED << 32) | u64::from(exit_code as u32))
    }

    pub fn zombie(exit_code: i32) -> Self {
        Self((Self::ZOMBIE << 32) | u64::from(exit_code as u32))
    }

    fn state(self) -> u64 {
        self.0 >> 32
    }

    pub fn exit_code(self) -> Option<i32> {
        if self.state() == Self::ALIVE {
            return None;
        }
        Some(self.0 as u32 as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessStatus;

    #[test]
    fn status_keeps_exit_code() {
        assert_eq!(ProcessStatus::alive().exit_code(), None);
        assert_eq!(ProcessStatus::exited(3).exit_code(), Some(3));
        assert_eq!(ProcessStatus::zombie(-1).exit_code(), Some(-1));
        assert_ne!(ProcessStatus::exited(3), ProcessStatus::zombie(3));
    }
}
