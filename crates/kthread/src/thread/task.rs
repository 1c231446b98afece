use alloc::boxed::Box;
use core::future::Future;

use futures::{future::BoxFuture, FutureExt};
use triomphe::Arc;

use super::Thread;

type Entry = dyn FnOnce(Arc<Thread>, usize, Option<Box<[u8]>>) -> BoxFuture<'static, i32> + Send;

/// 线程的入口。线程开始运行时以当前线程、参数长度和参数调用，返回值即线程的退出码
pub struct Task(Box<Entry>);

impl Task {
    pub fn new<F, Fut>(entry: F) -> Self
    where
        F: FnOnce(Arc<Thread>, usize, Option<Box<[u8]>>) -> Fut + Send + 'static,
        Fut: Future<Output = i32> + Send + 'static,
    {
        Self(Box::new(move |thread, argl, args| {
            entry(thread, argl, args).boxed()
        }))
    }

    pub(crate) fn call(
        self,
        thread: Arc<Thread>,
        argl: usize,
        args: Option<Box<[u8]>>,
    ) -> BoxFuture<'static, i32> {
        (self.0)(thread, argl, args)
    }
}
