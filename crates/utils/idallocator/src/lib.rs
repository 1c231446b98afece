#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::vec::Vec;

/// 基于回收的 id 分配器，即用 vector 收集释放的 id，优先复用最近释放的
///
/// 内核里用它分配 pid。pid 在僵尸进程被回收之后才会被释放
#[derive(Clone, Debug)]
pub struct RecycleAllocator {
    begin: usize,
    current: usize,
    recycled: Vec<usize>,
}

impl Default for RecycleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecycleAllocator {
    /// 默认从 0 开始分配
    pub const fn new() -> Self {
        Self::begin_with(0)
    }

    /// 显式决定从哪个数开始分配
    pub const fn begin_with(begin: usize) -> Self {
        RecycleAllocator {
            begin,
            current: begin,
            recycled: Vec::new(),
        }
    }

    pub fn alloc(&mut self) -> usize {
        if let Some(id) = self.recycled.pop() {
            id
        } else {
            self.current += 1;
            self.current - 1
        }
    }

    pub fn dealloc(&mut self, id: usize) {
        debug_assert!((self.begin..self.current).contains(&id));
        debug_assert!(!self.recycled.contains(&id), "id {id} has been deallocated!");
        self.recycled.push(id);
    }

    /// 当前仍被占用的 id 数量
    pub fn in_use(&self) -> usize {
        self.current - self.begin - self.recycled.len()
    }
}

#[cfg(test)]
mod tests {
    use super::RecycleAllocator;

    #[test]
    fn allocates_from_begin() {
        let mut allocator = RecycleAllocator::begin_with(1);
        assert_eq!(allocator.alloc(), 1);
        assert_eq!(allocator.alloc(), 2);
        assert_eq!(allocator.in_use(), 2);
    }

    #[test]
    fn reuses_recycled_ids() {
        let mut allocator = RecycleAllocator::new();
        let a = allocator.alloc();
        let b = allocator.alloc();
        allocator.dealloc(a);
        assert_eq!(allocator.in_use(), 1);
        assert_eq!(allocator.alloc(), a);
        assert_eq!(allocator.alloc(), b + 1);
    }

    #[test]
    #[should_panic(expected = "has been deallocated")]
    fn double_dealloc_is_caught() {
        let mut allocator = RecycleAllocator::new();
        let a = allocator.alloc();
        allocator.dealloc(a);
        allocator.dealloc(a);
    }
}
