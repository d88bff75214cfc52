use prosetyped_model::{Fragment, Node, Schema};
use std::time::Instant;

use crate::events::{Emitter, EventKind, ListenerId, RevealEvent};
use crate::options::Options;
use crate::position::reveal_size;
use crate::prefix::common_prefix;
use crate::timer::{Clock, SystemClock, TimerSlot};
use crate::view::{self, CursorStyle};

#[derive(Debug)]
enum BlinkPhase {
    /// Show the stored cursor-less snapshot.
    Hide(Fragment),
    /// Re-render with the cursor.
    Show,
}

/// One typing animation over a document tree.
///
/// The session moves `current_pos` one position per tick toward
/// `target_pos`, emitting a [`RevealEvent::View`] snapshot each time, and a
/// [`RevealEvent::Complete`] once the target is reached. Replacement trees
/// arrive through [`RevealSession::update_node`]; the session rewinds only as
/// far as the two trees differ.
///
/// Nothing happens between calls: the host drives the session by calling
/// [`RevealSession::poll`] at or after [`RevealSession::next_deadline`].
#[derive(Debug)]
pub struct RevealSession<C: Clock = SystemClock> {
    current_node: Node,
    next_node: Option<Node>,
    current_pos: usize,
    target_pos: usize,
    is_complete: bool,
    /// Cursor hidden by `hide_cursor_after_complete`, to be restored on the
    /// next step.
    cursor_auto_hidden: bool,
    destroyed: bool,
    options: Options,
    schema: Schema,
    clock: C,
    created_at: Instant,
    typing_timer: TimerSlot<()>,
    blink_timer: TimerSlot<BlinkPhase>,
    emitter: Emitter,
}

impl RevealSession<SystemClock> {
    pub fn new(doc: Node, options: Options) -> Self {
        Self::with_parts(doc, options, Schema::markdown(), SystemClock)
    }
}

impl<C: Clock> RevealSession<C> {
    pub fn with_parts(doc: Node, options: Options, schema: Schema, clock: C) -> Self {
        let created_at = clock.now();
        let target_pos = reveal_size(&doc);
        let mut session = Self {
            current_node: doc,
            next_node: None,
            current_pos: 0,
            target_pos,
            is_complete: false,
            cursor_auto_hidden: false,
            destroyed: false,
            options,
            schema,
            clock,
            created_at,
            typing_timer: TimerSlot::new(),
            blink_timer: TimerSlot::new(),
            emitter: Emitter::new(),
        };
        if session.options.auto_start {
            let first_tick = created_at + session.options.start_delay();
            session.typing_timer.schedule(first_tick, ());
        }
        session
    }

    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&RevealEvent) + 'static) -> ListenerId {
        self.emitter.on(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.emitter.off(id)
    }

    pub fn is_running(&self) -> bool {
        self.typing_timer.is_pending()
    }

    pub fn is_blinking(&self) -> bool {
        self.blink_timer.is_pending()
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn current_pos(&self) -> usize {
        self.current_pos
    }

    pub fn target_pos(&self) -> usize {
        self.target_pos
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn current_node(&self) -> &Node {
        &self.current_node
    }

    pub fn queued_node(&self) -> Option<&Node> {
        self.next_node.as_ref()
    }

    /// Earliest instant at which [`RevealSession::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.typing_timer.deadline(), self.blink_timer.deadline()) {
            (Some(typing), Some(blink)) => Some(typing.min(blink)),
            (typing, blink) => typing.or(blink),
        }
    }

    /// Fire every timer that is due, typing before blinking. Returns how
    /// many fired.
    pub fn poll(&mut self) -> usize {
        let mut fired = 0;
        while !self.destroyed {
            let now = self.clock.now();
            if let Some((deadline, ())) = self.typing_timer.take_due(now) {
                self.typing(deadline);
            } else if let Some((_, phase)) = self.blink_timer.take_due(now) {
                self.blink(phase);
            } else {
                break;
            }
            fired += 1;
        }
        fired
    }

    pub fn start(&mut self) {
        if self.destroyed || self.is_running() {
            return;
        }
        self.blink_timer.cancel();
        let now = self.clock.now();
        let begin = self.created_at + self.options.start_delay();
        if now < begin {
            self.typing_timer.schedule(begin, ());
        } else {
            self.typing(now);
        }
    }

    pub fn pause(&mut self) {
        if self.destroyed {
            return;
        }
        self.typing_timer.cancel();
    }

    /// Jump straight to the end of the newest tree.
    pub fn stop(&mut self) {
        if self.destroyed {
            return;
        }
        self.typing_timer.cancel();
        if let Some(next) = self.next_node.take() {
            self.current_node = next;
        }
        let size = reveal_size(&self.current_node);
        if self.current_pos != size || self.target_pos != size {
            self.is_complete = false;
        }
        self.current_pos = size;
        self.target_pos = size;
        self.finish();
    }

    /// Queue `tree` to replace the current one.
    ///
    /// The reveal retargets to the end of the prefix both trees share. When
    /// that is behind the cursor the reveal walks back to it; otherwise it
    /// keeps typing the shared content. Either way the queued tree is swapped
    /// in once the target is reached and typing continues to its end.
    pub fn update_node(&mut self, tree: Node, show_cursor: Option<bool>) {
        if self.destroyed {
            return;
        }
        let common = common_prefix(&self.current_node, &tree, &self.options.ignore_attributes);
        log::debug!(
            "retarget from {} (at {}) to {common}, queued tree size {}",
            self.target_pos,
            self.current_pos,
            reveal_size(&tree)
        );
        self.target_pos = common;
        self.next_node = Some(tree);

        if !self.is_running() {
            match show_cursor {
                Some(true) => self.show_cursor(),
                Some(false) => self.hide_cursor(),
                None => {}
            }
            self.start();
        }
    }

    pub fn show_cursor(&mut self) {
        if self.destroyed {
            return;
        }
        self.cursor_auto_hidden = false;
        if self.options.show_cursor {
            return;
        }
        self.options.show_cursor = true;
        self.render();
    }

    pub fn hide_cursor(&mut self) {
        if self.destroyed {
            return;
        }
        self.cursor_auto_hidden = false;
        self.blink_timer.cancel();
        if !self.options.show_cursor {
            return;
        }
        self.options.show_cursor = false;
        self.render();
    }

    /// Cancel all timers and drop listeners. Every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.typing_timer.cancel();
        self.blink_timer.cancel();
        self.emitter.clear();
        self.next_node = None;
        self.destroyed = true;
    }

    /// One tick. `base` is the instant the tick was due, so the next one is
    /// spaced from it rather than from when the host got round to polling.
    fn typing(&mut self, base: Instant) {
        self.typing_timer.cancel();
        self.blink_timer.cancel();

        if self.current_pos == self.target_pos {
            let Some(next) = self.next_node.take() else {
                self.finish();
                return;
            };
            self.current_node = next;
            self.target_pos = reveal_size(&self.current_node);
            log::debug!(
                "swapped in queued tree at {}, new target {}",
                self.current_pos,
                self.target_pos
            );
            // Nothing left to reveal: completion stays latched.
            if self.target_pos == self.current_pos {
                self.finish();
                return;
            }
        }

        if self.current_pos < self.target_pos {
            self.current_pos += 1;
        } else {
            self.current_pos -= 1;
        }
        log::trace!("tick {} -> {}", self.current_pos, self.target_pos);
        self.is_complete = false;
        if self.cursor_auto_hidden {
            self.cursor_auto_hidden = false;
            self.options.show_cursor = true;
        }
        self.typing_timer
            .schedule(base + self.options.typing_interval(), ());
        self.render();
    }

    fn finish(&mut self) {
        if self.options.hide_cursor_after_complete && self.options.show_cursor {
            self.options.show_cursor = false;
            self.cursor_auto_hidden = true;
            self.blink_timer.cancel();
        }
        self.render();
        if !self.is_complete {
            self.is_complete = true;
            log::debug!("reveal complete at {}", self.current_pos);
            self.emitter.emit(&RevealEvent::Complete);
        }
    }

    fn render(&mut self) {
        let cursor = self
            .options
            .show_cursor
            .then(|| CursorStyle::resolve(&self.options, &self.schema));
        let projection = view::project(&self.current_node, self.current_pos, cursor.as_ref());

        self.blink_timer.cancel();
        if let Some(blink) = projection.blink
            && !self.is_running()
        {
            let at = self.clock.now() + self.options.blink_period();
            self.blink_timer.schedule(at, BlinkPhase::Hide(blink));
        }
        self.emitter.emit(&RevealEvent::View(projection.visible));
    }

    fn blink(&mut self, phase: BlinkPhase) {
        match phase {
            BlinkPhase::Hide(snapshot) => {
                let at = self.clock.now() + self.options.blink_period();
                self.blink_timer.schedule(at, BlinkPhase::Show);
                self.emitter.emit(&RevealEvent::View(snapshot));
            }
            BlinkPhase::Show => self.render(),
        }
    }
}
