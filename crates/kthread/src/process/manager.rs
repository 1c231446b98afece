use alloc::collections::BTreeMap;

use defines::config::INITPROC_PID;
use klocks::SpinMutex;
use triomphe::Arc;

use super::{Pid, Process};

/// 进程表，从 pid 查找进程
pub struct ProcessManager(SpinMutex<BTreeMap<Pid, Arc<Process>>>);

impl ProcessManager {
    pub const fn new() -> Self {
        Self(SpinMutex::new(BTreeMap::new()))
    }

    pub fn add(&self, pid: Pid, process: Arc<Process>) {
        self.0.lock().insert(pid, process);
    }

    pub fn remove(&self, pid: Pid) -> Option<Arc<Process>> {
        self.0.lock().remove(&pid)
    }

    pub fn get(&self, pid: Pid) -> Option<Arc<Process>> {
        self.0.lock().get(&pid).cloned()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.0.lock().contains_key(&pid)
    }

    pub fn init_proc(&self) -> Arc<Process> {
        Arc::clone(
            self.0
                .lock()
                .get(&INITPROC_PID)
                .expect("initproc should never die"),
        )
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}
