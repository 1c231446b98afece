use alloc::{boxed::Box, collections::VecDeque, vec::Vec};

use hashbrown::HashMap;
use triomphe::Arc;

use super::Process;
use crate::{
    fs::FdTable,
    thread::{Thread, ThreadRecord, Tid},
};

pub struct ProcessInner {
    /* 这里添加的资源都需要考虑在 `process::teardown()` 时释放 */
    /* 以及在 `Process::new()` 时初始化 */

    /* 进程 */
    /// 进程清理后置空
    pub parent: Option<Arc<Process>>,
    /// 所有尚未被回收的子进程，包括已经退出的
    pub children: Vec<Arc<Process>>,
    /// 已退出、等待 `sys_wait_child` 回收的子进程
    pub exited_children: VecDeque<Arc<Process>>,
    pub args: Option<Box<[u8]>>,

    /* 文件 */
    pub fd_table: FdTable,

    /* 线程 */
    pub thread_records: HashMap<Tid, Arc<ThreadRecord>>,
    pub live_thread_count: usize,
    pub main_thread: Option<Arc<Thread>>,
}
