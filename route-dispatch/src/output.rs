//! Output capture
//!
//! Handlers may produce output as a side effect, through [`write`] or the
//! [`echo!`](crate::echo) macro, instead of returning it. While a capture
//! region is open on the current thread that output is buffered in the
//! innermost region; otherwise it goes straight to stdout.
//!
//! Regions nest and are strictly scoped: [`begin`] hands out a
//! [`CaptureGuard`], [`CaptureGuard::finish`] closes the region and returns
//! the text, and dropping the guard without finishing (an early `?` return or
//! a panic unwinding through it) closes the region and throws the text away.
//!
//! ```rust,ignore
//! let capture = output::begin();
//! route_dispatch::echo!("hello {}", name);
//! assert_eq!(capture.finish(), "hello world");
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::Write;
use std::marker::PhantomData;

struct Region {
    id: u64,
    text: String,
}

thread_local! {
    static REGIONS: RefCell<Vec<Region>> = const { RefCell::new(Vec::new()) };
    static NEXT_REGION: Cell<u64> = const { Cell::new(0) };
}

/// Open a capture region on the current thread.
pub fn begin() -> CaptureGuard {
    let id = NEXT_REGION.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        id
    });
    let level = REGIONS.with(|regions| {
        let mut regions = regions.borrow_mut();
        regions.push(Region {
            id,
            text: String::new(),
        });
        regions.len()
    });
    tracing::trace!(level, region = id, "Output capture started");
    CaptureGuard {
        id,
        level,
        closed: false,
        _not_send: PhantomData,
    }
}

/// Number of capture regions open on the current thread.
pub fn depth() -> usize {
    REGIONS.with(|regions| regions.borrow().len())
}

/// Write `text` to the innermost capture region, or to stdout.
pub fn write(text: &str) {
    let captured = REGIONS.with(|regions| match regions.borrow_mut().last_mut() {
        Some(region) => {
            region.text.push_str(text);
            true
        }
        None => false,
    });
    if !captured {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = stdout.write_all(text.as_bytes()) {
            tracing::warn!(error = %err, "Failed to write uncaptured output");
        }
    }
}

/// Formatting entry point behind [`echo!`](crate::echo).
pub fn write_fmt(args: fmt::Arguments<'_>) {
    match args.as_str() {
        Some(text) => write(text),
        None => write(&args.to_string()),
    }
}

/// Write formatted output the way `print!` does, but through the capture
/// regions of [`output`](crate::output).
#[macro_export]
macro_rules! echo {
    ($($arg:tt)*) => {
        $crate::output::write_fmt(format_args!($($arg)*))
    };
}

/// An open capture region. Not `Send`: regions belong to the thread that
/// opened them.
#[must_use = "dropping the guard immediately discards the captured output"]
pub struct CaptureGuard {
    id: u64,
    level: usize,
    closed: bool,
    _not_send: PhantomData<*const ()>,
}

impl CaptureGuard {
    /// Nesting level of this region, starting at 1.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Close the region and return what was written into it.
    pub fn finish(mut self) -> String {
        self.closed = true;
        self.close()
    }

    /// Close the region owned by this guard, together with any region
    /// opened inside it and leaked. A guard whose region was already closed
    /// by an enclosing one touches nothing.
    fn close(&self) -> String {
        REGIONS.with(|regions| {
            let mut regions = regions.borrow_mut();
            match regions.iter().rposition(|region| region.id == self.id) {
                Some(position) => {
                    regions.truncate(position + 1);
                    regions.pop().map(|region| region.text).unwrap_or_default()
                }
                None => String::new(),
            }
        })
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if !self.closed {
            let discarded = self.close();
            tracing::trace!(
                level = self.level,
                region = self.id,
                bytes = discarded.len(),
                "Output capture discarded"
            );
        }
    }
}

impl fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureGuard")
            .field("id", &self.id)
            .field("level", &self.level)
            .finish()
    }
}
