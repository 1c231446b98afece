mod record;
mod task;
mod user;

use alloc::{boxed::Box, sync::Arc as KArc};
use core::{fmt, num::NonZeroUsize};

use atomic::{Atomic, Ordering};
use triomphe::Arc;

pub use self::{
    record::{ThreadRecord, ThreadRecordInner},
    task::Task,
    user::spawn_user_thread,
};
pub(crate) use self::user::exit_thread;
use crate::{kernel::Kernel, process::Process};

/// 表示“没有线程”的原始 tid
pub const NOTHREAD: usize = 0;

/// 线程 id。由内核单调递增地分配，同一个内核中不会重复
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Tid(NonZeroUsize);

impl Tid {
    pub(crate) fn new(raw: NonZeroUsize) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }

    /// [`NOTHREAD`] 对应 `None`
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 线程的执行上下文，即调度器层面的可运行实体
///
/// 它与一个 [`ThreadRecord`] 绑定。执行上下文在线程退出后随任务一起被丢弃，
/// 而记录可能还要留着，直到被 join 或者进程清理时回收
pub struct Thread {
    tid: Tid,
    pub status: Atomic<ThreadStatus>,
    pub process: Arc<Process>,
    record: Arc<ThreadRecord>,
    kernel: KArc<Kernel>,
}

impl Thread {
    /// 在 `process` 中新建一个线程：分配 tid，把记录插入进程的线程记录表，
    /// 并增加进程的存活线程数。返回的线程还需要 [`spawn_user_thread()`] 才会被调度
    pub fn new(
        kernel: &KArc<Kernel>,
        process: &Arc<Process>,
        task: Task,
        argl: usize,
        args: Option<Box<[u8]>>,
    ) -> Arc<Self> {
        let tid = kernel.alloc_tid();
        let record = Arc::new(ThreadRecord::new(tid, task, argl, args));
        process.lock_inner_with(|inner| {
            inner.thread_records.insert(tid, Arc::clone(&record));
            inner.live_thread_count += 1;
        });
        Arc::new(Self {
            tid,
            status: Atomic::new(ThreadStatus::Ready),
            process: Arc::clone(process),
            record,
            kernel: KArc::clone(kernel),
        })
    }

    pub fn tid(&self) -> Tid {
        self.tid
    }

    /// 该线程自己的记录
    pub fn record(&self) -> &Arc<ThreadRecord> {
        &self.record
    }

    pub fn kernel(&self) -> &KArc<Kernel> {
        &self.kernel
    }

    pub fn set_status(&self, status: ThreadStatus) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub fn status(&self) -> ThreadStatus {
        self.status.load(Ordering::SeqCst)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreadStatus {
    Ready,
    Running,
    Blocking,
    Terminated,
}

unsafe impl bytemuck::NoUninit for ThreadStatus {}

#[cfg(test)]
mod tests {
    use super::{Tid, NOTHREAD};

    #[test]
    fn raw_tid() {
        assert_eq!(Tid::from_raw(NOTHREAD), None);
        let tid = Tid::from_raw(7).unwrap();
        assert_eq!(tid.as_raw(), 7);
        assert_eq!(tid.to_string(), "7");
    }
}
