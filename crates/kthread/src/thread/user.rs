use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use atomic::Ordering;
use triomphe::Arc;

use super::{Thread, ThreadStatus};
use crate::process;

/// 把线程交给执行器调度
pub fn spawn_user_thread(thread: Arc<Thread>) {
    let status_thread = Arc::clone(&thread);
    let (runnable, task) = thread.kernel().executor().spawn_with(
        ThreadFuture::new(Arc::clone(&thread), thread_start(Arc::clone(&thread))),
        // 进入就绪队列时设为 `Ready`
        move || status_thread.set_status(ThreadStatus::Ready),
    );
    runnable.schedule();
    task.detach();
}

/// 取出入口和参数并运行。入口返回的值即退出码
async fn thread_start(thread: Arc<Thread>) -> i32 {
    let Some((task, argl, args)) = thread.record().take_entry() else {
        error!("thread {} has no entry", thread.tid());
        return -1;
    };
    task.call(thread, argl, args).await
}

/// 线程退出。如果它是进程中最后一个存活的线程，则接着清理进程
///
/// 之后线程状态为 `Terminated`，[`ThreadFuture`] 不会再 poll 它
pub(crate) fn exit_thread(thread: &Thread, exit_value: i32) {
    if thread.status() == ThreadStatus::Terminated {
        return;
    }
    debug!("thread exits with {exit_value}");
    thread.record().mark_exited(exit_value);
    thread.set_status(ThreadStatus::Terminated);

    // 递减和读取在同一次加锁内完成
    let remaining = thread.process.lock_inner_with(|inner| {
        inner.live_thread_count -= 1;
        inner.live_thread_count
    });
    if remaining == 0 {
        process::teardown(&thread.process, thread.kernel(), exit_value);
    }
}

/// 用来处理线程获取控制权以及让出控制权时的状态切换
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project::pin_project]
struct ThreadFuture<F: Future<Output = i32> + Send> {
    #[pin]
    future: F,
    thread: Arc<Thread>,
}

impl<F: Future<Output = i32> + Send> ThreadFuture<F> {
    #[inline]
    fn new(thread: Arc<Thread>, future: F) -> Self {
        Self { future, thread }
    }
}

impl<F: Future<Output = i32> + Send> Future for ThreadFuture<F> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let pid = self.thread.process.pid();
        let tid = self.thread.tid().as_raw();
        let _enter = info_span!("thread", pid = pid, tid = tid).entered();
        trace!("thread running");
        self.thread.set_status(ThreadStatus::Running);

        let project = self.project();
        match project.future.poll(cx) {
            Poll::Ready(exit_value) => {
                exit_thread(project.thread, exit_value);
                Poll::Ready(())
            }
            Poll::Pending => {
                match project.thread.status.compare_exchange(
                    ThreadStatus::Running,
                    ThreadStatus::Blocking,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                ) {
                    // 已经在 `sys_thread_exit` 中退出了，结束这个任务，执行器会丢弃它
                    Err(ThreadStatus::Terminated) => {
                        trace!("thread terminated");
                        Poll::Ready(())
                    }
                    _ => Poll::Pending,
                }
            }
        }
    }
}
