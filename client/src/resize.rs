use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Debounce window for resize-triggered redraws.
const RESIZE_DEBOUNCE_MS: u32 = 100;

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
    static PENDING_REDRAW: RefCell<Option<Timeout>> = const { RefCell::new(None) };
}

/// Install (or replace) the window resize listener. Each resize event
/// re-arms a debounce timeout; when it fires, the `redraw` generation
/// signal is bumped and the chart re-measures its container.
pub fn install(redraw: RwSignal<u64>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "resize",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });

    let handler = Closure::<dyn Fn()>::new(move || schedule_redraw(redraw));
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    }
}

/// Arm the debounce window. A still-pending timeout is cancelled, so a
/// burst of resize events collapses into a single redraw after the last
/// one settles.
fn schedule_redraw(redraw: RwSignal<u64>) {
    let timeout = Timeout::new(RESIZE_DEBOUNCE_MS, move || {
        PENDING_REDRAW.with(|slot| {
            slot.borrow_mut().take();
        });
        redraw.update(|generation| *generation = generation.wrapping_add(1));
    });
    if let Some(superseded) = supersede(timeout) {
        superseded.cancel();
    }
}

fn supersede(next: Timeout) -> Option<Timeout> {
    PENDING_REDRAW.with(|slot| slot.borrow_mut().replace(next))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    // The wasm Timeout can't run on the host; the property that matters is
    // the slot discipline: re-arming hands back exactly the superseded
    // entry so only the newest timer survives.
    fn supersede_in<T>(slot: &RefCell<Option<T>>, next: T) -> Option<T> {
        slot.borrow_mut().replace(next)
    }

    #[test]
    fn rearming_supersedes_the_pending_entry() {
        let slot = RefCell::new(None);
        assert_eq!(supersede_in(&slot, 1), None);
        assert_eq!(supersede_in(&slot, 2), Some(1));
        assert_eq!(supersede_in(&slot, 3), Some(2));
        assert_eq!(slot.borrow_mut().take(), Some(3));
        assert_eq!(slot.borrow_mut().take(), None);
    }
}
