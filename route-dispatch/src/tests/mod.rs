//! Test module for route-dispatch
//!
//! Property-based tests (proptest) and example tests for route definition,
//! middleware composition, output capture and invocation strategies.

use std::sync::{Arc, Mutex};

use crate::middleware::{MiddlewareFn, from_fn};





#[cfg(test)]
pub mod route_tests;


/// Shared execution log
pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Middleware that records `<name>_enter` and `<name>_exit` around `next`
pub(crate) fn logging_middleware(name: &str, log: &Log) -> MiddlewareFn {
    let name = name.to_string();
    let log = log.clone();
    from_fn(move |req, res, next| {
        log.lock().unwrap().push(format!("{}_enter", name));
        let res = next(req, res)?;
        log.lock().unwrap().push(format!("{}_exit", name));
        Ok(res)
    })
}
