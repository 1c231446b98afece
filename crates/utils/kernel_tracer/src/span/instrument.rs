use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use pin_project::pin_project;

use crate::span::Span;

/// 让 future 每次被 poll 时都处在某个 span 中
///
/// 协作式调度下一个 future 可能被 poll 多次，中间穿插着其他线程，
/// 因此不能直接 `span.entered()` 然后跨越 `.await`
pub trait Instrument: Future + Sized {
    fn instrument(self, span: Span) -> Instrumented<Self> {
        Instrumented { inner: self, span }
    }
}

impl<T: Future> Instrument for T {}

#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct Instrumented<F: Future> {
    #[pin]
    inner: F,
    span: Span,
}

impl<F: Future> Future for Instrumented<F> {
    type Output = F::Output;

    #[inline]
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let project = self.project();
        let _enter = project.span.enter();
        project.inner.poll(cx)
    }
}
