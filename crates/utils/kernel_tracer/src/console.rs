//! 宿主机上的控制台输出，一般只在测试中使用

use alloc::string::String;

use crate::{Log, Record, KERNEL_TRACER};

struct StderrLog;

impl Log for StderrLog {
    fn log(&self, record: &Record<'_>) {
        let mut line = String::new();
        if KERNEL_TRACER.write_log(&mut line, record).is_ok() {
            std::eprint!("{line}");
        }
    }
}

/// 把日志输出到 stderr。多次调用是无害的
pub fn init_console() {
    static LOGGER: StderrLog = StderrLog;
    crate::set_logger(&LOGGER);
}
