//! 文件描述符相关的系统调用

use alloc::boxed::Box;

use defines::error::{errno, KResult};
use triomphe::Arc;

use crate::{
    fs::{FileDescriptor, Stream},
    thread::Thread,
};

/// 在当前进程中打开一个文件，返回最小可用的 fd
pub fn sys_open(curr: &Arc<Thread>, stream: Box<dyn Stream>) -> KResult<usize> {
    let desc = FileDescriptor::from_stream(stream);
    // 添加失败时锁内只丢弃副本，文件在锁外随 `desc` 关闭
    let fd = curr
        .process
        .lock_inner_with(|inner| inner.fd_table.add(desc.clone()));
    drop(desc);
    fd
}

/// 复制一个 fd，新旧 fd 指向同一个文件
pub fn sys_dup(curr: &Arc<Thread>, fd: usize) -> KResult<usize> {
    curr.process.lock_inner_with(|inner| {
        let desc = inner.fd_table.get(fd).ok_or(errno::EBADF)?.clone();
        inner.fd_table.add(desc)
    })
}

/// 关闭一个 fd。文件在最后一个引用释放时才真正关闭
pub fn sys_close(curr: &Arc<Thread>, fd: usize) -> KResult<()> {
    let desc = curr
        .process
        .lock_inner_with(|inner| inner.fd_table.remove(fd))
        .ok_or(errno::EBADF)?;
    // 在锁外释放
    drop(desc);
    Ok(())
}
