use std::{cell::Cell, fmt, num::NonZeroU64};

/// Names one reactive object: a binding, a model, a list or a list observer
/// registration.
///
/// Ids are handed out per thread, starting at 1, and never reused. The whole
/// reactive graph lives on one thread so this is enough to keep them unique.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(NonZeroU64);

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

impl Id {
    pub fn next() -> Id {
        NEXT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            Id(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
        })
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
