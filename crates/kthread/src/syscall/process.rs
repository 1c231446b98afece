//! 进程相关的系统调用

use defines::error::{errno, KResult};
use event_listener::listener;
use triomphe::Arc;

use crate::{
    process::Pid,
    thread::{Task, Thread},
};

/// 挂起当前线程，让出 CPU，永不失败
pub async fn sys_yield() {
    executor::yield_now().await;
}

/// 返回当前进程 id，永不失败
pub fn sys_getpid(curr: &Arc<Thread>) -> Pid {
    curr.process.pid()
}

/// 返回当前进程的父进程的 id，永不失败
pub fn sys_getppid(curr: &Arc<Thread>) -> Pid {
    // INITPROC(pid=1) 没有父进程，返回 0
    curr.process
        .lock_inner_with(|inner| inner.parent.as_ref().map_or(0, |p| p.pid()))
}

/// 创建一个子进程，其主线程运行 `task`。返回子进程 pid
///
/// 子进程复制一份参数，并与当前进程共享打开的文件
pub fn sys_exec(
    curr: &Arc<Thread>,
    task: Option<Task>,
    argl: usize,
    args: Option<&[u8]>,
) -> KResult<Pid> {
    let task = task.ok_or(errno::EINVAL)?;
    let child = curr
        .kernel()
        .create_process(Some(&curr.process), task, argl, args);
    Ok(child.pid())
}

/// 挂起本线程，等待子进程退出，并回收它。返回子进程的 pid 和退出码
///
/// `pid` 为 `None` 时等待任意一个子进程。没有符合条件的子进程时返回 `ECHILD`
pub async fn sys_wait_child(curr: &Arc<Thread>, pid: Option<Pid>) -> KResult<(Pid, i32)> {
    let process = &curr.process;
    let is_target = |child_pid: Pid| pid.map_or(true, |pid| pid == child_pid);
    loop {
        listener!(process.child_exit => listener);
        let found = process.lock_inner_with(|inner| {
            if !inner.children.iter().any(|child| is_target(child.pid())) {
                return Err(errno::ECHILD);
            }
            let zombie = inner
                .exited_children
                .iter()
                .enumerate()
                .find_map(|(index, child)| {
                    if !is_target(child.pid()) {
                        return None;
                    }
                    child.zombie_exit_code().map(|code| (index, code))
                });
            let Some((index, exit_code)) = zombie else {
                return Ok(None);
            };
            let child = inner.exited_children.remove(index);
            if let Some(child) = &child {
                inner.children.retain(|other| !Arc::ptr_eq(other, child));
            }
            Ok(child.map(|child| (child, exit_code)))
        })?;

        if let Some((child, exit_code)) = found {
            curr.kernel().reap(child.pid());
            debug!("reap child {} with exit code {exit_code}", child.pid());
            return Ok((child.pid(), exit_code));
        }
        listener.await;
    }
}
