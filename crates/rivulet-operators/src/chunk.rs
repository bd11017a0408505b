//! Chunking: fixed-size groups and time-window groups.
//!
//! Neither form emits empty chunks; the final partial chunk is flushed at
//! completion. Errors discard the open chunk.

use std::cell::RefCell;
use std::rc::Rc;

use rivulet_core::{
    ArgumentError, Disposable, Observable, Observer, SerialDisposable, SharedObservable,
    StreamError,
};
use rivulet_sched::SharedScheduler;

struct Chunk<T> {
    source: SharedObservable<T>,
    size: usize,
}

struct ChunkObserver<T> {
    buffer: Vec<T>,
    size: usize,
    downstream: Box<dyn Observer<Vec<T>>>,
}

impl<T: 'static> Observer<T> for ChunkObserver<T> {
    fn on_next(&mut self, value: T) {
        self.buffer.push(value);
        if self.buffer.len() == self.size {
            let full = std::mem::take(&mut self.buffer);
            self.downstream.on_next(full);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        self.buffer.clear();
        self.downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        if !self.buffer.is_empty() {
            let partial = std::mem::take(&mut self.buffer);
            self.downstream.on_next(partial);
        }
        self.downstream.on_completed();
    }
}

impl<T: 'static> Observable<Vec<T>> for Chunk<T> {
    fn subscribe(&self, observer: Box<dyn Observer<Vec<T>>>) -> Disposable {
        self.source.subscribe(Box::new(ChunkObserver {
            buffer: Vec::with_capacity(self.size),
            size: self.size,
            downstream: observer,
        }))
    }
}

/// Splits the sequence into chunks of `size`; the last chunk may be
/// smaller.
pub fn chunk<T: 'static>(
    source: &SharedObservable<T>,
    size: usize,
) -> Result<SharedObservable<Vec<T>>, ArgumentError> {
    if size == 0 {
        return Err(ArgumentError::ChunkSize);
    }
    Ok(Rc::new(Chunk {
        source: source.clone(),
        size,
    }))
}

struct ChunkWithin<T> {
    source: SharedObservable<T>,
    window: u64,
    scheduler: SharedScheduler,
}

struct WindowState<T> {
    buffer: Vec<T>,
    timer: SerialDisposable,
    downstream: Option<Box<dyn Observer<Vec<T>>>>,
}

impl<T> WindowState<T> {
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let full = std::mem::take(&mut self.buffer);
        if let Some(downstream) = self.downstream.as_mut() {
            downstream.on_next(full);
        }
    }
}

struct ChunkWithinObserver<T> {
    state: Rc<RefCell<WindowState<T>>>,
    window: u64,
    scheduler: SharedScheduler,
}

impl<T: 'static> Observer<T> for ChunkWithinObserver<T> {
    fn on_next(&mut self, value: T) {
        let opens_window = {
            let mut state = self.state.borrow_mut();
            if state.downstream.is_none() {
                return;
            }
            let opens = state.buffer.is_empty();
            state.buffer.push(value);
            opens
        };
        // The first element of a chunk starts its time window.
        if opens_window {
            let state = self.state.clone();
            let handle = self.scheduler.schedule_after(
                self.window,
                Box::new(move || state.borrow_mut().flush()),
            );
            self.state.borrow().timer.set(handle);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        let mut state = self.state.borrow_mut();
        let Some(mut downstream) = state.downstream.take() else {
            return;
        };
        state.buffer.clear();
        state.timer.dispose();
        downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.downstream.is_none() {
            return;
        }
        state.flush();
        state.timer.dispose();
        if let Some(mut downstream) = state.downstream.take() {
            downstream.on_completed();
        }
    }
}

impl<T: 'static> Observable<Vec<T>> for ChunkWithin<T> {
    fn subscribe(&self, observer: Box<dyn Observer<Vec<T>>>) -> Disposable {
        let state = Rc::new(RefCell::new(WindowState {
            buffer: Vec::new(),
            timer: SerialDisposable::new(),
            downstream: Some(observer),
        }));
        let upstream = self.source.subscribe(Box::new(ChunkWithinObserver {
            state: state.clone(),
            window: self.window,
            scheduler: self.scheduler.clone(),
        }));
        Disposable::new(move || {
            let mut s = state.borrow_mut();
            s.downstream = None;
            s.buffer.clear();
            s.timer.dispose();
            drop(s);
            upstream.dispose();
        })
    }
}

/// Splits the sequence into chunks by time: the first element after a
/// flush opens a window of `window` ticks, and everything arriving inside
/// it lands in the same chunk.
pub fn chunk_within<T: 'static>(
    source: &SharedObservable<T>,
    window: u64,
    scheduler: SharedScheduler,
) -> Result<SharedObservable<Vec<T>>, ArgumentError> {
    if window == 0 {
        return Err(ArgumentError::WindowLength);
    }
    Ok(Rc::new(ChunkWithin {
        source: source.clone(),
        window,
        scheduler,
    }))
}
