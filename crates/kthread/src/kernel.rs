use alloc::{boxed::Box, sync::Arc as KArc};
use core::{
    num::NonZeroUsize,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use defines::{
    config::INITPROC_PID,
    error::{errno, KResult},
};
use executor::Executor;
use idallocator::RecycleAllocator;
use klocks::SpinMutex;
use triomphe::Arc;

use crate::{
    fs::FdTable,
    process::{Pid, Process, ProcessManager},
    thread::{self, Task, Thread, Tid},
};

/// 一个内核实例：执行器、进程表以及 pid、tid 的分配
///
/// 各个内核实例之间互不影响
pub struct Kernel {
    executor: Executor,
    processes: ProcessManager,
    pid_allocator: SpinMutex<RecycleAllocator>,
    /// 下一个分配的 tid 减一。tid 不回收
    next_tid: AtomicUsize,
    shutdown: AtomicBool,
}

impl Kernel {
    pub fn new() -> KArc<Self> {
        KArc::new(Self {
            executor: Executor::new(),
            processes: ProcessManager::new(),
            pid_allocator: SpinMutex::new(RecycleAllocator::begin_with(INITPROC_PID)),
            next_tid: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
        })
    }

    /// 创建 initproc 并让它的主线程进入就绪队列。之后需要 [`Kernel::run_until_idle()`]
    pub fn boot(
        self: &KArc<Self>,
        task: Option<Task>,
        argl: usize,
        args: Option<&[u8]>,
    ) -> KResult<Arc<Process>> {
        if self.processes.contains(INITPROC_PID) {
            return Err(errno::EEXIST);
        }
        let task = task.ok_or(errno::EINVAL)?;
        let initproc = self.create_process(None, task, argl, args);
        debug_assert_eq!(initproc.pid(), INITPROC_PID);
        Ok(initproc)
    }

    /// 创建一个进程，主线程运行 `task`。参数会被复制两份，分别给进程和主线程
    ///
    /// 子进程与父进程共享打开的文件
    pub(crate) fn create_process(
        self: &KArc<Self>,
        parent: Option<&Arc<Process>>,
        task: Task,
        argl: usize,
        args: Option<&[u8]>,
    ) -> Arc<Process> {
        let pid = self.pid_allocator.lock().alloc();
        let _enter = info_span!("spawn process", pid = pid).entered();
        let fd_table = parent.map_or_else(FdTable::new, |parent| {
            parent.lock_inner_with(|inner| inner.fd_table.clone())
        });
        let process = Arc::new(Process::new(
            pid,
            parent.cloned(),
            args.map(Box::from),
            fd_table,
        ));
        self.processes.add(pid, Arc::clone(&process));
        if let Some(parent) = parent {
            // 新进程添入原进程的子进程表
            parent.lock_inner_with(|inner| inner.children.push(Arc::clone(&process)));
        }

        let main_thread = Thread::new(self, &process, task, argl, args.map(Box::from));
        process.lock_inner_with(|inner| inner.main_thread = Some(Arc::clone(&main_thread)));
        info!("main thread {}", main_thread.tid());
        thread::spawn_user_thread(main_thread);
        process
    }

    /// 不断运行就绪的线程，直到没有线程可运行。返回 poll 的次数
    pub fn run_until_idle(&self) -> usize {
        self.executor.run_until_idle()
    }

    pub fn init_proc(&self) -> Arc<Process> {
        self.processes.init_proc()
    }

    pub fn process(&self, pid: Pid) -> Option<Arc<Process>> {
        self.processes.get(pid)
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// initproc 退出后为真
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub(crate) fn set_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub(crate) fn executor(&self) -> &Executor {
        &self.executor
    }

    pub(crate) fn alloc_tid(&self) -> Tid {
        let n = self.next_tid.fetch_add(1, Ordering::Relaxed);
        Tid::new(NonZeroUsize::MIN.saturating_add(n))
    }

    /// 回收僵尸进程：从进程表中移除并释放 pid
    pub(crate) fn reap(&self, pid: Pid) {
        self.processes.remove(pid);
        self.pid_allocator.lock().dealloc(pid);
    }

    /// 仍被占用的 pid 数量
    pub fn pids_in_use(&self) -> usize {
        self.pid_allocator.lock().in_use()
    }
}
