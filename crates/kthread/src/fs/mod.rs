//! 打开文件表
//!
//! 这里只关心文件的引用计数：描述符槽位持有文件控制块的引用，
//! 最后一个引用被释放时文件才真正关闭

mod file;

pub use self::file::{FdTable, FileControlBlock, FileDescriptor, Stream};
