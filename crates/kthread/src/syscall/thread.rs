//! 线程相关的系统调用

use alloc::boxed::Box;
use core::convert::Infallible;

use defines::error::{errno, KResult};
use kernel_tracer::Instrument;
use scopeguard::ScopeGuard;
use triomphe::Arc;

use crate::thread::{self, Task, Thread, ThreadRecord, Tid};

/// 在当前进程中创建一个线程，运行 `task`。返回新线程的 tid
///
/// `task` 为 `None` 时什么都不做，返回 `None`
pub fn sys_create_thread(
    curr: &Arc<Thread>,
    task: Option<Task>,
    argl: usize,
    args: Option<Box<[u8]>>,
) -> Option<Tid> {
    let task = task?;
    let new_thread = Thread::new(curr.kernel(), &curr.process, task, argl, args);
    let tid = new_thread.tid();
    debug!("create thread {tid}");
    thread::spawn_user_thread(new_thread);
    Some(tid)
}

/// 返回当前线程的 tid，永不失败
pub fn sys_thread_self(curr: &Arc<Thread>) -> Tid {
    curr.tid()
}

/// 在当前进程中查找线程记录
fn find_record(curr: &Thread, tid: Tid) -> KResult<Arc<ThreadRecord>> {
    curr.process
        .lock_inner_with(|inner| inner.thread_records.get(&tid).cloned())
        .ok_or(errno::ESRCH)
}

/// 从进程中回收线程记录。已经被别人回收的话什么都不做
fn reclaim_record(curr: &Thread, tid: Tid) {
    let reclaimed = curr
        .process
        .lock_inner_with(|inner| inner.thread_records.remove(&tid));
    if reclaimed.is_some() {
        trace!("reclaim thread {tid}");
    }
}

/// 等待同一进程中的线程 `tid` 退出。若 `exit_value` 非空，则向其中写入退出码
///
/// 错误：
/// - `ESRCH` 找不到该线程，包括已经被回收的
/// - `EDEADLK` join 自己
/// - `EINVAL` 该线程已经被 detach
/// - `DETACHED` 等待期间该线程被 detach
///
/// 最后一个成功 join 的线程负责从进程中回收该线程的记录。
/// 等待中途被丢弃的 join 会注销自己，不影响其他 joiner
pub async fn sys_thread_join(
    curr: &Arc<Thread>,
    tid: Tid,
    exit_value: Option<&mut i32>,
) -> KResult<()> {
    let record = find_record(curr, tid)?;
    if tid == curr.tid() {
        return Err(errno::EDEADLK);
    }
    record.enter_join()?;
    let joining = scopeguard::guard(&record, |record| {
        debug!("join on thread {tid} cancelled");
        if record.cancel_join() {
            reclaim_record(curr, tid);
        }
    });
    let span = debug_span!("join", tid = tid.as_raw());
    joining.wait_settled().instrument(span).await;
    let (value, is_last) = ScopeGuard::into_inner(joining).leave_join()?;
    if let Some(exit_value) = exit_value {
        *exit_value = value;
    }
    if is_last {
        reclaim_record(curr, tid);
    }
    Ok(())
}

/// 使线程 `tid` 不可 join。正在等待它的 joiner 会以 `DETACHED` 失败返回
///
/// 错误：
/// - `ESRCH` 找不到该线程
/// - `EINVAL` 该线程已经退出
pub fn sys_thread_detach(curr: &Arc<Thread>, tid: Tid) -> KResult<()> {
    find_record(curr, tid)?.detach()
}

/// 退出当前线程，永远不会返回
///
/// 如果是进程中最后一个存活的线程，则同时清理进程
pub async fn sys_thread_exit(curr: &Arc<Thread>, exit_value: i32) -> Infallible {
    thread::exit_thread(curr, exit_value);
    core::future::pending().await
}
