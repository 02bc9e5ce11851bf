use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;

/// Coalesces bursts of calls into a single callback run `delay_ms` after
/// the last one.
pub(crate) struct Debouncer {
    delay_ms: u32,
    callback: Rc<dyn Fn()>,
    handle: RefCell<Option<Timeout>>,
}

impl Debouncer {
    pub(crate) fn new(delay_ms: u32, callback: Rc<dyn Fn()>) -> Rc<Self> {
        Rc::new(Self {
            delay_ms,
            callback,
            handle: RefCell::new(None),
        })
    }

    pub(crate) fn trigger(self: &Rc<Self>) {
        let debouncer = Rc::downgrade(self);
        let timeout = Timeout::new(self.delay_ms, move || {
            let Some(debouncer) = debouncer.upgrade() else {
                return;
            };
            (debouncer.callback)();
        });
        // Dropping the previous handle cancels it if it has not fired yet.
        *self.handle.borrow_mut() = Some(timeout);
    }

    pub(crate) fn cancel(&self) {
        if let Some(timeout) = self.handle.borrow_mut().take() {
            timeout.cancel();
        }
    }
}
