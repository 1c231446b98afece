/// 根进程（initproc）的 pid。进程退出时，其子进程都会被过继给它
pub const INITPROC_PID: usize = 1;

/// 每个进程可同时打开的文件描述符数量上限
pub const MAX_FD_NUM: usize = 16;

/// 就绪队列长度的软上限。超过时只会打印警告，并不会拒绝调度
pub const TASK_LIMIT: usize = 256;
