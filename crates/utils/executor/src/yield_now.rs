use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// 即刻让出控制权，并且立刻 wake（一般而言就是立刻重新进入就绪队列的队尾）
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub fn yield_now() -> impl Future<Output = ()> {
    YieldFuture { yielded: false }
}

struct YieldFuture {
    yielded: bool,
}

impl Future for YieldFuture {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
