// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::{Condvar, Mutex};

/// A bounded pool of ready instances for multi-threaded workloads.
///
/// One engine instance is single-threaded; the pool hands exclusive
/// instances to concurrent callers. `acquire` pops an idle instance, creates
/// a fresh one while the population is below `max_pool_size`, and otherwise
/// blocks until a release. `release` returns the instance and wakes one
/// waiter. Nothing but queue manipulation happens inside the lock; instance
/// construction runs after the lock is dropped.
pub struct WeftPool<T> {
    state: Mutex<PoolState<T>>,
    available: Condvar,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    max_pool_size: usize,
}

struct PoolState<T> {
    idle: Vec<T>,
    total: usize,
}

impl<T> WeftPool<T> {
    pub fn new<F>(min_pool_size: usize, max_pool_size: usize, factory: F) -> WeftPool<T>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        assert!(max_pool_size >= min_pool_size.max(1));
        let idle: Vec<T> = (0..min_pool_size).map(|_| factory()).collect();
        let total = idle.len();
        WeftPool {
            state: Mutex::new(PoolState { idle, total }),
            available: Condvar::new(),
            factory: Box::new(factory),
            max_pool_size,
        }
    }

    /// Takes an instance, blocking while all instances are in use and the
    /// population is at `max_pool_size`.
    pub fn acquire(&self) -> T {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(item) = state.idle.pop() {
                return item;
            }
            if state.total < self.max_pool_size {
                state.total += 1;
                drop(state);
                return (self.factory)();
            }
            state = self.available.wait(state).unwrap();
        }
    }

    /// Returns an instance to the idle set and signals one waiter.
    pub fn release(&self, item: T) {
        let mut state = self.state.lock().unwrap();
        state.idle.push(item);
        drop(state);
        self.available.notify_one();
    }

    /// Acquire/release wrapper: runs `f` with exclusive access.
    pub fn run<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut item = self.acquire();
        let result = f(&mut item);
        self.release(item);
        result
    }

    /// Number of idle instances; contraction is lazy, so this shrinks only
    /// as callers hold instances.
    pub fn idle_count(&self) -> usize {
        self.state.lock().unwrap().idle.len()
    }
}
