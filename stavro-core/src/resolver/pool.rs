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

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::buffer::Writer;
use crate::util::Spinlock;

const NUM_SEGMENTS: usize = 16;
/// Items kept per segment; extra returns are dropped.
const SEGMENT_CAPACITY: usize = 8;

static THREAD_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static SEGMENT_INDEX: Cell<usize> =
        Cell::new(THREAD_ID_COUNTER.fetch_add(1, Ordering::Relaxed) % NUM_SEGMENTS);
}

/// State that must not leak from one borrower to the next.
pub trait Reusable {
    fn reset(&mut self);
}

impl Reusable for Writer {
    fn reset(&mut self) {
        Writer::reset(self)
    }
}

/// A segmented pool with non-blocking acquire-or-allocate semantics.
///
/// Each thread maps to one segment. A borrower that finds its segment locked
/// or empty allocates a fresh item, and an item returned to a locked or full
/// segment is dropped, so no caller ever waits on another.
pub struct Pool<T> {
    segments: [Spinlock<Vec<T>>; NUM_SEGMENTS],
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Reusable> Pool<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Pool {
            segments: std::array::from_fn(|_| Spinlock::new(Vec::new())),
            factory: Box::new(factory),
        }
    }

    /// Lends an exclusively owned, freshly reset item to `handler`.
    /// The item is reset again before it goes back.
    pub fn borrow_mut<R>(&self, handler: impl FnOnce(&mut T) -> R) -> R {
        let segment = &self.segments[SEGMENT_INDEX.with(|idx| idx.get())];
        let mut item = segment
            .try_lock()
            .and_then(|mut items| items.pop())
            .unwrap_or_else(|| (self.factory)());
        item.reset();
        let result = handler(&mut item);
        item.reset();
        if let Some(mut items) = segment.try_lock() {
            if items.len() < SEGMENT_CAPACITY {
                items.push(item);
            }
        }
        result
    }
}
