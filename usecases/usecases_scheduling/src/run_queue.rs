//! Run Queue Management
//!
//! Provides the ready and blocked queues the scheduler moves processes
//! between. Queues own their processes, so moving a process from one queue
//! to another is a move of the value itself.

use std::collections::VecDeque;

use entities_process::{IoEvent, Process, ProcessId};

/// Ready queue statistics
///
/// Tracks the high-water mark and the number of enqueues over the queue's
/// lifetime, for summary reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunQueueInfo {
    /// Longest the queue has been
    peak_len: usize,
    /// Processes enqueued, counting requeues
    enqueued: u64,
}

impl RunQueueInfo {
    /// Create an empty instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the longest the queue has been
    pub fn peak_len(&self) -> usize {
        self.peak_len
    }

    /// Get total enqueues, counting requeues
    pub fn enqueued(&self) -> u64 {
        self.enqueued
    }

    fn record_enqueue(&mut self, len: usize) {
        self.enqueued += 1;
        self.peak_len = self.peak_len.max(len);
    }
}

/// FIFO of processes eligible to run
#[derive(Debug, Default)]
pub struct ReadyQueue {
    queue: VecDeque<Process>,
    info: RunQueueInfo,
}

impl ReadyQueue {
    /// Create an empty instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a process at the end of the queue
    pub fn enqueue(&mut self, process: Process) {
        self.queue.push_back(process);
        self.info.record_enqueue(self.queue.len());
    }

    /// Dequeue a process from the front of the queue
    pub fn dequeue(&mut self) -> Option<Process> {
        self.queue.pop_front()
    }

    /// Process that will be dispatched next
    pub fn front(&self) -> Option<&Process> {
        self.queue.front()
    }

    /// Get current length
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate processes in queue order
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.queue.iter()
    }

    /// Find a queued process by pid
    pub fn find(&self, pid: ProcessId) -> Option<&Process> {
        self.queue.iter().find(|process| process.pid() == pid)
    }

    /// Get queue statistics
    pub fn info(&self) -> RunQueueInfo {
        self.info
    }
}

/// Processes waiting for an I/O event
///
/// Insertion order is kept; interrupt delivery releases matches in that
/// order.
#[derive(Debug, Default)]
pub struct BlockedQueue {
    queue: VecDeque<Process>,
}

impl BlockedQueue {
    /// Create an empty instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a blocked process at the end of the queue
    pub fn enqueue(&mut self, process: Process) {
        self.queue.push_back(process);
    }

    /// Pids of every process waiting on `event`, in insertion order
    pub fn waiting_on(&self, event: IoEvent) -> Vec<ProcessId> {
        self.queue
            .iter()
            .filter(|process| process.event_waiting() == Some(event))
            .map(Process::pid)
            .collect()
    }

    /// Take a process out of the queue, preserving the order of the rest
    pub fn remove(&mut self, pid: ProcessId) -> Option<Process> {
        let index = self.queue.iter().position(|process| process.pid() == pid)?;
        self.queue.remove(index)
    }

    /// Get current length
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate processes in queue order
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.queue.iter()
    }

    /// Find a queued process by pid
    pub fn find(&self, pid: ProcessId) -> Option<&Process> {
        self.queue.iter().find(|process| process.pid() == pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_process::{Opcode, ProcessStatus};

    fn blocked(pid: ProcessId, op: Opcode) -> Process {
        let mut process = Process::new(pid, vec![op]);
        process.transition(ProcessStatus::Running).unwrap();
        if let Some(event) = op.io_event() {
            process.block_on(event).unwrap();
        }
        process
    }

    #[test]
    fn test_ready_queue_fifo() {
        let mut queue = ReadyQueue::new();
        assert!(queue.is_empty());
        for pid in 0..3 {
            queue.enqueue(Process::new(pid, vec![Opcode::Compute]));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front().map(Process::pid), Some(0));
        assert_eq!(queue.dequeue().map(|p| p.pid()), Some(0));
        assert_eq!(queue.dequeue().map(|p| p.pid()), Some(1));
        assert_eq!(queue.dequeue().map(|p| p.pid()), Some(2));
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_run_queue_info() {
        let mut queue = ReadyQueue::new();
        queue.enqueue(Process::new(1, vec![Opcode::Compute]));
        queue.enqueue(Process::new(2, vec![Opcode::Compute]));
        let requeued = queue.dequeue().unwrap();
        queue.enqueue(requeued);

        let info = queue.info();
        assert_eq!(info.enqueued(), 3);
        assert_eq!(info.peak_len(), 2);
    }

    #[test]
    fn test_ready_queue_find() {
        let mut queue = ReadyQueue::new();
        queue.enqueue(Process::new(4, vec![Opcode::Output]));
        assert!(queue.find(4).is_some());
        assert!(queue.find(5).is_none());
    }

    #[test]
    fn test_blocked_queue_waiting_on() {
        let mut queue = BlockedQueue::new();
        queue.enqueue(blocked(1, Opcode::Input));
        queue.enqueue(blocked(2, Opcode::Output));
        queue.enqueue(blocked(3, Opcode::Input));

        assert_eq!(queue.waiting_on(IoEvent::Input), vec![1, 3]);
        assert_eq!(queue.waiting_on(IoEvent::Output), vec![2]);
    }

    #[test]
    fn test_blocked_queue_remove_keeps_order() {
        let mut queue = BlockedQueue::new();
        for pid in 1..=4 {
            queue.enqueue(blocked(pid, Opcode::Input));
        }
        assert_eq!(queue.remove(2).map(|p| p.pid()), Some(2));
        assert!(queue.remove(2).is_none());
        let order: Vec<ProcessId> = queue.iter().map(Process::pid).collect();
        assert_eq!(order, vec![1, 3, 4]);
        assert_eq!(queue.len(), 3);
    }
}
