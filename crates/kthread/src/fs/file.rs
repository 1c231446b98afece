use alloc::{boxed::Box, collections::BTreeMap};
use core::{mem, ops::Deref};

use defines::{
    config::MAX_FD_NUM,
    error::{errno, KResult},
};
use triomphe::Arc;

/// 文件背后的具体对象。最后一个引用被释放时会调用 `close()`
pub trait Stream: Send + Sync {
    fn close(&self);
}

/// 文件控制块，被所有指向它的描述符共享
pub struct FileControlBlock {
    stream: Box<dyn Stream>,
}

impl FileControlBlock {
    pub fn new(stream: Box<dyn Stream>) -> Self {
        Self { stream }
    }

    pub fn stream(&self) -> &dyn Stream {
        &*self.stream
    }
}

impl Drop for FileControlBlock {
    fn drop(&mut self) {
        self.stream.close();
    }
}

#[derive(Clone)]
pub struct FdTable {
    files: BTreeMap<usize, FileDescriptor>,
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FdTable {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    /// 找到最小可用的 fd，插入一个描述符，并返回该 fd
    ///
    /// 如果超过进程文件描述符上限则返回 `EMFILE`
    pub fn add(&mut self, desc: FileDescriptor) -> KResult<usize> {
        if self.files.len() >= MAX_FD_NUM {
            return Err(errno::EMFILE);
        }
        let mut new_fd = 0;
        for &existed_fd in self.files.keys() {
            if new_fd != existed_fd {
                break;
            }
            new_fd += 1;
        }
        self.files.insert(new_fd, desc);
        Ok(new_fd)
    }

    pub fn get(&self, fd: usize) -> Option<&FileDescriptor> {
        self.files.get(&fd)
    }

    pub fn remove(&mut self, fd: usize) -> Option<FileDescriptor> {
        self.files.remove(&fd)
    }

    /// 清空所有槽位，取出原有的描述符
    ///
    /// 文件在返回值被丢弃时才可能关闭，是否关闭取决于是否还有其他进程引用它。
    /// 调用者应在锁外丢弃返回值
    #[must_use = "files are closed when the returned table is dropped"]
    pub fn release_all(&mut self) -> FdTable {
        mem::take(self)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Clone)]
pub struct FileDescriptor {
    file: Arc<FileControlBlock>,
}

impl FileDescriptor {
    pub fn new(file: Arc<FileControlBlock>) -> Self {
        Self { file }
    }

    pub fn from_stream(stream: Box<dyn Stream>) -> Self {
        Self::new(Arc::new(FileControlBlock::new(stream)))
    }
}

impl Deref for FileDescriptor {
    type Target = Arc<FileControlBlock>;

    fn deref(&self) -> &Self::Target {
        &self.file
    }
}
