use core::fmt::Arguments;

use crate::Level;

/// 一条日志记录
#[derive(Clone, Debug)]
pub struct Record<'a> {
    level: Level,
    module_path: &'static str,
    args: Arguments<'a>,
}

impl<'a> Record<'a> {
    #[inline]
    pub fn new(level: Level, module_path: &'static str, args: Arguments<'a>) -> Self {
        Self {
            level,
            module_path,
            args,
        }
    }

    /// 消息内容
    #[inline]
    pub fn args(&self) -> &Arguments<'a> {
        &self.args
    }

    /// 消息的日志等级
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// 打印日志的模块
    #[inline]
    pub fn module_path(&self) -> &'static str {
        self.module_path
    }
}
