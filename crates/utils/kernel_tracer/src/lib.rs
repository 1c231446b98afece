//! 内核日志与 span 追踪
//!
//! `info!`、`trace!` 等宏负责打印日志，`info_span!` 等宏创建 [`Span`]。
//! 进入 span 后打印的日志会带上 span 栈上所有 span 的名字和键值对，如
//!
//! ```text
//! [DEBUG]-thread{pid=1 tid=3}: join target exited
//! ```
//!
//! 日志最终交给通过 [`set_logger()`] 注册的 [`Log`] 实现输出；没有注册时直接丢弃。

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

#[macro_use]
mod macros;
mod level;
mod record;
mod span;

#[cfg(feature = "std")]
mod console;

pub use level::{Level, LevelFilter, CLOG};
pub use record::Record;
pub use span::{
    instrument::{Instrument, Instrumented},
    loggable::Loggable,
    OwnedEnterGuard, Span,
};

#[cfg(feature = "std")]
pub use console::init_console;

use core::fmt::Write;

use alloc::vec::Vec;
use anstyle::{AnsiColor, Reset, Style};
use klocks::{Lazy, Once, SpinMutex};
use slab::Slab;
use span::{SpanData, SpanId};

pub static KERNEL_TRACER: Lazy<KernelTracer> = Lazy::new(|| KernelTracer {
    slab: SpinMutex::new(Slab::with_capacity(64)),
    span_stack: SpinMutex::new(Vec::with_capacity(32)),
    logger: Once::new(),
});

/// 日志的输出端
pub trait Log: Sync {
    fn log(&self, record: &Record<'_>);
}

pub struct KernelTracer {
    slab: SpinMutex<Slab<SpanData>>,
    span_stack: SpinMutex<Vec<SpanId>>,
    logger: Once<&'static dyn Log>,
}

impl KernelTracer {
    /// 按照 `[LEVEL]-span{k=v}: message` 的格式把一条日志写进 `writer`
    pub fn write_log(&self, writer: &mut impl Write, record: &Record<'_>) -> core::fmt::Result {
        // 开头部分，即日志级别，如 `[ INFO]`
        let color = match record.level() {
            Level::Error => AnsiColor::Red,
            Level::Warn => AnsiColor::BrightYellow,
            Level::Info => AnsiColor::Blue,
            Level::Debug => AnsiColor::Green,
            Level::Trace => AnsiColor::BrightBlack,
        };
        write!(
            writer,
            "{}[{:>5}]{}",
            color.render_fg(),
            record.level(),
            Reset.render()
        )?;
        // 调试级别的日志带上模块路径，方便定位
        if record.level() >= Level::Debug {
            write!(writer, " {}", record.module_path())?;
        }

        // Span 栈部分
        let mut has_span = false;
        {
            let slab = self.slab.lock();
            let stack = self.span_stack.lock();

            const SPAN_NAME_COLOR: Style = AnsiColor::White.on_default().bold();

            for id in stack.iter() {
                let Some(span_data) = slab.get(id.as_slab_index()) else {
                    continue;
                };
                has_span = true;

                write!(
                    writer,
                    "-{}{}{}",
                    SPAN_NAME_COLOR.render(),
                    span_data.name(),
                    Reset.render()
                )?;
                if let Some(kvs) = span_data.kvs() {
                    write!(writer, "{{{kvs}}}")?;
                }
            }
        }
        if has_span {
            write!(writer, ": ")?;
        } else {
            write!(writer, " ")?;
        }

        // 日志信息部分
        writeln!(writer, "{}", record.args())
    }
}

/// 注册日志输出端。只有第一次注册生效，返回是否注册成功
pub fn set_logger(logger: &'static dyn Log) -> bool {
    let mut installed = false;
    KERNEL_TRACER.logger.call_once(|| {
        installed = true;
        logger
    });
    installed
}

#[inline]
#[doc(hidden)]
pub fn log_impl(level: Level, module_path: &'static str, args: core::fmt::Arguments<'_>) {
    if level > CLOG {
        return;
    }
    if let Some(logger) = KERNEL_TRACER.logger.get() {
        logger.log(&Record::new(level, module_path, args));
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{Level, Loggable, Record, Span, KERNEL_TRACER};

    #[test]
    fn write_log_with_span() {
        let _enter = Span::new(
            Level::Info,
            "thread",
            Some(&[("pid", &1usize as &dyn Loggable), ("tid", &3usize as &dyn Loggable)]),
        )
        .entered();
        let mut out = String::new();
        let record = Record::new(Level::Info, module_path!(), format_args!("joined {}", 3));
        KERNEL_TRACER.write_log(&mut out, &record).unwrap();
        assert!(out.contains("thread"));
        assert!(out.contains("{pid=1 tid=3}: joined 3"));
        assert!(out.ends_with('\n'));
    }
}
