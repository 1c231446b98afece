use alloc::boxed::Box;

use defines::error::{errno, KResult};
use event_listener::{listener, Event};
use klocks::SpinMutex;

use super::{Task, Tid};

/// 线程记录，调用者可见的 tid 所指代的对象
///
/// 线程退出后，记录依然保留在所属进程的线程记录表中，以便其他线程 join 获取退出码。
/// 它只会以两种方式之一被回收（即从记录表中移除）：
/// - 成功 join 并且是最后一个离开的 joiner
/// - 进程最后一个线程退出时的清理
pub struct ThreadRecord {
    tid: Tid,
    /// 线程退出或被 detach 时广播，唤醒所有 joiner
    pub exit_signal: Event,
    inner: SpinMutex<ThreadRecordInner>,
}

pub struct ThreadRecordInner {
    /* 入口与参数，线程开始运行时被取走 */
    pub task: Option<Task>,
    pub argl: usize,
    pub args: Option<Box<[u8]>>,

    pub exited: bool,
    pub detached: bool,
    /// 仅在 `exited` 之后有意义
    pub exit_value: i32,
    /// 正阻塞在 join 中的线程数
    pub wait_count: usize,
    /// 已有 joiner 成功取走退出码
    pub joined: bool,
}

impl ThreadRecord {
    pub fn new(tid: Tid, task: Task, argl: usize, args: Option<Box<[u8]>>) -> Self {
        Self {
            tid,
            exit_signal: Event::new(),
            inner: SpinMutex::new(ThreadRecordInner {
                task: Some(task),
                argl,
                args,
                exited: false,
                detached: false,
                exit_value: 0,
                wait_count: 0,
                joined: false,
            }),
        }
    }

    pub fn tid(&self) -> Tid {
        self.tid
    }

    /// 锁 inner 然后进行操作，这是一个便捷方法
    pub fn lock_inner_with<T>(&self, f: impl FnOnce(&mut ThreadRecordInner) -> T) -> T {
        f(&mut self.inner.lock())
    }

    pub fn is_exited(&self) -> bool {
        self.lock_inner_with(|inner| inner.exited)
    }

    pub fn is_detached(&self) -> bool {
        self.lock_inner_with(|inner| inner.detached)
    }

    pub fn wait_count(&self) -> usize {
        self.lock_inner_with(|inner| inner.wait_count)
    }

    /// 退出码，线程尚未退出则为 `None`
    pub fn exit_value(&self) -> Option<i32> {
        self.lock_inner_with(|inner| inner.exited.then_some(inner.exit_value))
    }

    /// 取走入口和参数。只有线程自己在开始运行时会调用一次
    pub(crate) fn take_entry(&self) -> Option<(Task, usize, Option<Box<[u8]>>)> {
        self.lock_inner_with(|inner| {
            let task = inner.task.take()?;
            Some((task, inner.argl, inner.args.take()))
        })
    }

    /// 标记线程已退出并唤醒所有 joiner
    pub(crate) fn mark_exited(&self, exit_value: i32) {
        self.lock_inner_with(|inner| {
            debug_assert!(!inner.exited, "thread {} exits twice", self.tid);
            inner.exited = true;
            inner.exit_value = exit_value;
        });
        self.exit_signal.notify(usize::MAX);
    }

    /// 已退出的线程不能 detach。重复 detach 一个仍在运行的线程是允许的
    pub(crate) fn detach(&self) -> KResult<()> {
        self.lock_inner_with(|inner| {
            if inner.exited {
                return Err(errno::EINVAL);
            }
            inner.detached = true;
            Ok(())
        })?;
        self.exit_signal.notify(usize::MAX);
        Ok(())
    }

    /// 登记一个 joiner。已 detach 的线程不能被 join
    pub(crate) fn enter_join(&self) -> KResult<()> {
        self.lock_inner_with(|inner| {
            if inner.detached {
                return Err(errno::EINVAL);
            }
            inner.wait_count += 1;
            Ok(())
        })
    }

    /// 阻塞直到线程退出或被 detach
    pub(crate) async fn wait_settled(&self) {
        loop {
            listener!(self.exit_signal => listener);
            if self.lock_inner_with(|inner| inner.exited || inner.detached) {
                break;
            }
            trace!("wait for thread {} to exit", self.tid);
            listener.await;
        }
    }

    /// 注销一个 joiner。成功时返回退出码，以及自己是否是最后一个离开的 joiner
    pub(crate) fn leave_join(&self) -> KResult<(i32, bool)> {
        self.lock_inner_with(|inner| {
            inner.wait_count -= 1;
            if inner.detached {
                return Err(errno::DETACHED);
            }
            debug_assert!(inner.exited);
            inner.joined = true;
            Ok((inner.exit_value, inner.wait_count == 0))
        })
    }

    /// 注销一个中途被取消的 joiner
    ///
    /// 若已有 joiner 成功返回，而自己是最后一个离开的，返回真。此时由自己负责回收记录
    pub(crate) fn cancel_join(&self) -> bool {
        self.lock_inner_with(|inner| {
            inner.wait_count -= 1;
            inner.joined && inner.wait_count == 0
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use defines::error::errno;

    use super::ThreadRecord;
    use crate::thread::{Task, Tid};

    fn record() -> ThreadRecord {
        let task = Task::new(|_, _, _| async { 0 });
        ThreadRecord::new(Tid::from_raw(1).unwrap(), task, 3, Some(Box::from(&[1u8, 2, 3][..])))
    }

    #[test]
    fn entry_is_taken_once() {
        let record = record();
        let (_, argl, args) = record.take_entry().unwrap();
        assert_eq!(argl, 3);
        assert_eq!(args.as_deref(), Some(&[1u8, 2, 3][..]));
        assert!(record.take_entry().is_none());
    }

    #[test]
    fn join_after_exit() {
        let record = record();
        record.mark_exited(42);
        assert_eq!(record.exit_value(), Some(42));
        record.enter_join().unwrap();
        record.enter_join().unwrap();
        assert_eq!(record.wait_count(), 2);
        assert_eq!(record.leave_join(), Ok((42, false)));
        assert_eq!(record.leave_join(), Ok((42, true)));
        assert_eq!(record.wait_count(), 0);
    }

    #[test]
    fn detach_rules() {
        let record = record();
        record.detach().unwrap();
        // 再次 detach 一个仍在运行的线程
        record.detach().unwrap();
        assert_eq!(record.enter_join(), Err(errno::EINVAL));
        assert_eq!(record.wait_count(), 0);

        let record = self::record();
        record.mark_exited(1);
        assert_eq!(record.detach(), Err(errno::EINVAL));
        assert!(!record.is_detached());
    }

    #[test]
    fn detach_while_joining() {
        let record = record();
        record.enter_join().unwrap();
        record.detach().unwrap();
        assert_eq!(record.leave_join(), Err(errno::DETACHED));
        assert_eq!(record.wait_count(), 0);
        assert!(!record.is_exited());
    }

    #[test]
    fn cancelled_joiner_unregisters() {
        let record = record();
        record.enter_join().unwrap();
        assert!(!record.cancel_join());
        assert_eq!(record.wait_count(), 0);

        record.enter_join().unwrap();
        record.enter_join().unwrap();
        record.mark_exited(5);
        assert_eq!(record.leave_join(), Ok((5, false)));
        // 另一个 joiner 已经成功，被取消的这个是最后离开的
        assert!(record.cancel_join());
        assert_eq!(record.wait_count(), 0);
    }
}
