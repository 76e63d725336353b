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

use std::collections::HashMap;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::error::Error;

struct Call<T> {
    result: Mutex<Option<Result<T, Error>>>,
    done: Condvar,
}

/// Runs at most one builder per key at a time.
///
/// Callers that arrive while a build for the same key is running block until
/// it finishes and receive a clone of its result, success or failure. Keys are
/// forgotten once the build completes; remembering results is the caller's
/// cache, which must be published before [`SingleFlight::work`] returns.
pub struct SingleFlight<K, T> {
    calls: Mutex<HashMap<K, Arc<Call<T>>>>,
}

impl<K, T> Default for SingleFlight<K, T> {
    fn default() -> Self {
        SingleFlight {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, T> SingleFlight<K, T>
where
    K: Hash + Eq + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `build` for `key`, or waits for the build already running for it.
    /// The flag is true when the result came from another caller's build.
    pub fn work<F>(&self, key: &K, build: F) -> (Result<T, Error>, bool)
    where
        F: FnOnce() -> Result<T, Error>,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(call) = calls.get(key) {
                let call = Arc::clone(call);
                drop(calls);
                return (Self::wait(&call), true);
            }
            let call = Arc::new(Call {
                result: Mutex::new(None),
                done: Condvar::new(),
            });
            calls.insert(key.clone(), Arc::clone(&call));
            call
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(build));
        let result = match &outcome {
            Ok(result) => result.clone(),
            Err(_) => Err(Error::build_error(
                "coalesced build",
                Error::schema_error("builder panicked"),
            )),
        };
        *call.result.lock() = Some(result);
        call.done.notify_all();
        self.calls.lock().remove(key);

        match outcome {
            Ok(result) => (result, false),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn wait(call: &Call<T>) -> Result<T, Error> {
        trace!("waiting on an in-flight build");
        let mut result = call.result.lock();
        loop {
            if let Some(result) = result.as_ref() {
                return result.clone();
            }
            call.done.wait(&mut result);
        }
    }
}
