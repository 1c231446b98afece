pub mod instrument;
pub mod loggable;

use core::{fmt::Write, marker::PhantomData, num::NonZeroU32};

use compact_str::CompactString;

use crate::{Level, KERNEL_TRACER};

use self::loggable::Loggable;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpanId(NonZeroU32);

impl SpanId {
    pub fn as_slab_index(&self) -> usize {
        self.0.get() as usize - 1
    }
}

pub struct Span {
    id: Option<SpanId>,
}

impl Span {
    /// 创建一个新的 span。但只是将其注册，而没有实际实际启用。
    ///
    /// 调用 `entered()` 以进入该 span
    pub fn new<'a>(
        level: Level,
        name: &'static str,
        kvs: Option<&'a [(&'static str, &'a dyn Loggable)]>,
    ) -> Self {
        let kvs = kvs.filter(|kvs| !kvs.is_empty()).map(|kvs| {
            let mut kvs_str = CompactString::new("");
            for (i, (key, value)) in kvs.iter().enumerate() {
                if i > 0 {
                    kvs_str.push(' ');
                }
                // 写入 CompactString 不会失败
                let _ = write!(kvs_str, "{key}=");
                value.log(&mut kvs_str);
            }
            kvs_str
        });

        let span_data = SpanData { level, name, kvs };
        let id = KERNEL_TRACER.slab.lock().insert(span_data);
        Span {
            id: NonZeroU32::new(id as u32 + 1).map(SpanId),
        }
    }

    pub fn disabled() -> Self {
        Self { id: None }
    }

    pub(crate) fn enter(&self) -> RefEnterGuard<'_> {
        if let Some(id) = &self.id {
            KERNEL_TRACER.span_stack.lock().push(id.clone());
        }
        RefEnterGuard {
            span: self,
            _not_send: PhantomData,
        }
    }

    pub fn entered(self) -> OwnedEnterGuard {
        if let Some(id) = &self.id {
            KERNEL_TRACER.span_stack.lock().push(id.clone());
        }
        OwnedEnterGuard {
            span: self,
            _not_send: PhantomData,
        }
    }
}

impl Drop for Span {
    #[inline]
    fn drop(&mut self) {
        if let Some(id) = &self.id {
            KERNEL_TRACER.slab.lock().remove(id.as_slab_index());
        }
    }
}

/// 把 `id` 从 span 栈上移除
///
/// 单核下总是栈顶；宿主机上多个 OS 线程共用一个栈，退出顺序可能交错
fn exit_span(id: &SpanId) {
    let mut stack = KERNEL_TRACER.span_stack.lock();
    if stack.last() == Some(id) {
        stack.pop();
    } else if let Some(pos) = stack.iter().rposition(|entered| entered == id) {
        stack.remove(pos);
    }
}

#[must_use = "once a span has been entered, it should be exited"]
pub struct RefEnterGuard<'a> {
    span: &'a Span,
    _not_send: PhantomData<*const ()>,
}

impl Drop for RefEnterGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = &self.span.id {
            exit_span(id);
        }
    }
}

#[must_use = "once a span has been entered, it should be exited"]
pub struct OwnedEnterGuard {
    span: Span,
    _not_send: PhantomData<*const ()>,
}

impl Drop for OwnedEnterGuard {
    fn drop(&mut self) {
        if let Some(id) = &self.span.id {
            exit_span(id);
        }
    }
}

pub struct SpanData {
    name: &'static str,
    level: Level,
    kvs: Option<CompactString>,
}

impl SpanData {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kvs(&self) -> Option<&str> {
        self.kvs.as_deref()
    }
}
