//! 协作式的任务执行器
//!
//! 每个用户线程都是一个 future，由 `async_task` 包装成 [`Runnable`]，
//! 被唤醒时进入就绪队列。线程只会在 `.await` 处让出控制权

#![cfg_attr(not(test), no_std)]

mod yield_now;

extern crate alloc;
#[macro_use]
extern crate kernel_tracer;

use alloc::sync::Arc;
use core::future::Future;

use async_task::{Runnable, Task};
use crossbeam_queue::SegQueue;
use defines::config::TASK_LIMIT;

pub use self::yield_now::yield_now;

/// 就绪队列
struct TaskQueue {
    queue: SegQueue<Runnable>,
}

impl TaskQueue {
    fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }

    fn push_task(&self, runnable: Runnable) {
        self.queue.push(runnable);
        if self.queue.len() > TASK_LIMIT {
            warn!("ready queue grows beyond {TASK_LIMIT}");
        }
    }

    fn fetch_task(&self) -> Option<Runnable> {
        self.queue.pop()
    }
}

/// 每个内核实例持有一个执行器，测试之间因此互不干扰
pub struct Executor {
    queue: Arc<TaskQueue>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(TaskQueue::new()),
        }
    }

    /// 创建一个任务。返回的 [`Runnable`] 需要调用 `schedule()` 才会进入就绪队列
    ///
    /// `action` 会在任务每次被加入就绪队列前调用
    pub fn spawn_with<F, A>(&self, future: F, action: A) -> (Runnable, Task<F::Output>)
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        A: Fn() + Send + Sync + 'static,
    {
        let queue = Arc::clone(&self.queue);
        async_task::spawn(future, move |runnable| {
            action();
            queue.push_task(runnable);
        })
    }

    /// 不断从就绪队列中取出任务运行，直到队列为空。返回运行的次数
    pub fn run_until_idle(&self) -> usize {
        let mut polls = 0;
        while let Some(task) = self.queue.fetch_task() {
            trace!("Schedule new task");
            task.run();
            polls += 1;
        }
        polls
    }

    /// 就绪队列中的任务数量
    pub fn ready_len(&self) -> usize {
        self.queue.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        vec::Vec,
    };

    use super::{yield_now, Executor};

    #[test]
    fn runs_spawned_tasks() {
        let executor = Executor::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            let (runnable, task) = executor.spawn_with(
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                || {},
            );
            runnable.schedule();
            task.detach();
        }
        assert_eq!(executor.ready_len(), 3);
        assert_eq!(executor.run_until_idle(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(executor.run_until_idle(), 0);
    }

    #[test]
    fn yield_interleaves_tasks() {
        let executor = Executor::new();
        let trace = Arc::new(Mutex::new(Vec::new()));
        for id in 0..2 {
            let trace = Arc::clone(&trace);
            let (runnable, task) = executor.spawn_with(
                async move {
                    trace.lock().unwrap().push((id, 0));
                    yield_now().await;
                    trace.lock().unwrap().push((id, 1));
                },
                || {},
            );
            runnable.schedule();
            task.detach();
        }
        assert_eq!(executor.run_until_idle(), 4);
        assert_eq!(*trace.lock().unwrap(), [(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn action_runs_on_every_schedule() {
        let executor = Executor::new();
        let scheduled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&scheduled);
        let (runnable, task) = executor.spawn_with(
            async {
                yield_now().await;
            },
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        runnable.schedule();
        task.detach();
        executor.run_until_idle();
        assert_eq!(scheduled.load(Ordering::SeqCst), 2);
    }
}
