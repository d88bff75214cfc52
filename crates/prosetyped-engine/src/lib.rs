/*!
 * # Reveal engine
 *
 * Animates a document tree as if it were being typed, one position at a
 * time, and retargets the animation when the tree is replaced mid-flight.
 *
 * ## Pieces
 *
 * - **`session`**: [`RevealSession`], the state machine that owns the current
 *   tree, the revealed position and the two timer slots (typing, blink)
 * - **`prefix`**: the common-prefix resolver deciding how far a running
 *   reveal may keep what it already shows when new content arrives
 * - **`attrs`**: attribute comparison with configurable ignore lists
 * - **`view`**: projection of (tree, position) into the snapshot handed to
 *   listeners, including the cursor glyph
 * - **`timer`**: single-shot cancellable timer slots and the clocks driving them
 * - **`events`**: the `view` / `complete` listener registry
 * - **`position`**: semantic wrappers over the model's position arithmetic
 *
 * ## Driving a session
 *
 * The session never sleeps or spawns. The host asks for
 * [`RevealSession::next_deadline`], waits until then and calls
 * [`RevealSession::poll`]:
 *
 * ```rust
 * use prosetyped_engine::{EventKind, ManualClock, Options, RevealEvent, RevealSession};
 * use prosetyped_model::{Schema, markdown};
 * use std::time::Duration;
 *
 * let clock = ManualClock::new();
 * let options = Options { typing_speed: 10, show_cursor: false, ..Options::default() };
 * let mut session = RevealSession::with_parts(
 *     markdown::parse("Hi"),
 *     options,
 *     Schema::markdown(),
 *     clock.clone(),
 * );
 * session.on(EventKind::View, |event| {
 *     if let RevealEvent::View(content) = event {
 *         println!("{}", prosetyped_model::html::to_html(content));
 *     }
 * });
 *
 * while session.is_running() {
 *     clock.advance(Duration::from_millis(10));
 *     session.poll();
 * }
 * assert!(session.is_complete());
 * ```
 */

pub mod attrs;
pub mod events;
pub mod options;
pub mod position;
pub mod prefix;
pub mod session;
pub mod timer;
pub mod view;

pub use events::{EventKind, ListenerId, RevealEvent};
pub use options::{IgnoreAttribute, Options};
pub use prefix::common_prefix;
pub use session::RevealSession;
pub use timer::{Clock, ManualClock, SystemClock, TimerSlot};
pub use view::{CursorStyle, Projection};
