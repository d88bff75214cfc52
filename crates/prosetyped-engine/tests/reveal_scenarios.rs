use pretty_assertions::assert_eq;
use prosetyped_engine::{EventKind, ManualClock, Options, RevealEvent, RevealSession};
use prosetyped_model::{Fragment, Node, Schema, html, markdown};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

const TICK: u64 = 10;
const BLINK: u64 = 100;

struct Harness {
    clock: ManualClock,
    session: RevealSession<ManualClock>,
    views: Rc<RefCell<Vec<Fragment>>>,
    completes: Rc<Cell<usize>>,
}

impl Harness {
    fn new(doc: Node, options: Options) -> Self {
        Self::with_schema(doc, options, Schema::markdown())
    }

    fn with_schema(doc: Node, options: Options, schema: Schema) -> Self {
        let clock = ManualClock::new();
        let mut session = RevealSession::with_parts(doc, options, schema, clock.clone());
        let views = Rc::new(RefCell::new(Vec::new()));
        let completes = Rc::new(Cell::new(0));

        let sink = views.clone();
        session.on(EventKind::View, move |event| {
            if let RevealEvent::View(content) = event {
                sink.borrow_mut().push(content.clone());
            }
        });
        let counter = completes.clone();
        session.on(EventKind::Complete, move |_| counter.set(counter.get() + 1));

        Self {
            clock,
            session,
            views,
            completes,
        }
    }

    fn markdown(source: &str, options: Options) -> Self {
        Self::new(markdown::parse(source), options)
    }

    fn advance(&mut self, ms: u64) -> usize {
        self.clock.advance(Duration::from_millis(ms));
        self.session.poll()
    }

    /// Tick until the session stops typing, returning the position after
    /// every poll.
    fn run_to_idle(&mut self) -> Vec<usize> {
        let mut positions = Vec::new();
        if self.session.poll() > 0 {
            positions.push(self.session.current_pos());
        }
        for _ in 0..10_000 {
            if !self.session.is_running() {
                return positions;
            }
            self.advance(TICK);
            positions.push(self.session.current_pos());
        }
        panic!("session never went idle");
    }

    fn view_count(&self) -> usize {
        self.views.borrow().len()
    }

    fn last_view(&self) -> Fragment {
        self.views.borrow().last().cloned().expect("no view emitted")
    }

    fn last_text(&self) -> String {
        self.last_view().text_content()
    }
}

fn quiet() -> Options {
    Options {
        typing_speed: TICK,
        show_cursor: false,
        ..Options::default()
    }
}

fn with_cursor() -> Options {
    Options {
        typing_speed: TICK,
        blink_interval: BLINK,
        ..Options::default()
    }
}

#[test]
fn test_empty_paragraph_emits_every_position_then_completes_once() {
    let mut harness = Harness::new(Node::fill_doc(Fragment::empty()), quiet());

    harness.run_to_idle();

    assert_eq!(harness.view_count(), 3);
    assert_eq!(harness.completes.get(), 1);
    assert_eq!(harness.session.next_deadline(), None);
}

#[test]
fn test_full_reveal_without_cursor_equals_the_tree() {
    let source = "# Title\n\nSome *emphasis* and `code`\n\n- a\n- b";
    let doc = markdown::parse(source);
    let mut harness = Harness::markdown(source, quiet());

    harness.run_to_idle();

    assert_eq!(&harness.last_view(), doc.content());
    assert_eq!(harness.completes.get(), 1);
    assert!(harness.session.is_complete());
}

#[test]
fn test_each_tick_moves_exactly_one_position() {
    let doc = markdown::parse("ab\n\n> cd");
    let size = doc.content_size();
    let mut harness = Harness::new(doc, quiet());

    let positions = harness.run_to_idle();

    let expected: Vec<usize> = (1..=size).chain([size]).collect();
    assert_eq!(positions, expected);
}

#[test]
fn test_same_tree_update_while_idle_keeps_the_target() {
    let doc = markdown::parse("Hello");
    let mut harness = Harness::new(doc.clone(), quiet());
    harness.run_to_idle();
    let target = harness.session.target_pos();

    harness.session.update_node(doc.clone(), None);
    harness.session.update_node(doc, None);

    assert_eq!(harness.session.target_pos(), target);
    assert_eq!(harness.session.current_pos(), target);
    assert_eq!(harness.completes.get(), 1);
    assert!(!harness.session.is_running());
}

#[test]
fn test_diverging_replacement_rewinds_to_the_shared_prefix() {
    let mut harness = Harness::markdown("ABC", quiet());
    harness.run_to_idle();
    assert_eq!(harness.session.current_pos(), 5);

    harness.session.update_node(markdown::parse("AXY"), None);
    let mut positions = vec![harness.session.current_pos()];
    positions.extend(harness.run_to_idle());

    assert_eq!(positions, vec![4, 3, 2, 3, 4, 5, 5]);
    assert_eq!(harness.last_text(), "AXY");
    assert_eq!(harness.completes.get(), 2);
}

#[test]
fn test_extending_replacement_never_retracts() {
    let mut harness = Harness::markdown("Hello", quiet());
    harness.advance(0);
    harness.advance(TICK);
    harness.advance(TICK);
    assert_eq!(harness.session.current_pos(), 3);

    harness.session.update_node(markdown::parse("Hel, world"), None);
    assert_eq!(harness.session.target_pos(), 4);
    let positions = harness.run_to_idle();

    assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(positions.iter().all(|&pos| pos >= 3));
    assert_eq!(harness.last_text(), "Hel, world");
    assert_eq!(harness.completes.get(), 1);
}

#[test]
fn test_idle_cursor_blinks() {
    let mut harness = Harness::markdown("ab", with_cursor());
    harness.run_to_idle();
    assert!(harness.session.is_blinking());
    assert_eq!(harness.last_text(), "ab|");

    harness.advance(BLINK);
    assert_eq!(harness.last_text(), "ab");

    harness.advance(BLINK);
    assert_eq!(harness.last_text(), "ab|");

    harness.advance(BLINK);
    assert_eq!(harness.last_text(), "ab");
    assert!(!harness.session.is_running());
}

#[test]
fn test_typing_and_blinking_are_never_pending_together() {
    let mut harness = Harness::markdown("# a\n\nbcd\n\n- e", with_cursor());
    let trees = ["# a\n\nbcd\n\n- e", "# a\n\nbx", "", "# a\n\nbcd\n\n- e\n- f"];

    for step in 0..200usize {
        match step % 7 {
            0 => harness.session.start(),
            1 => harness.session.pause(),
            2 => harness
                .session
                .update_node(markdown::parse(trees[step % trees.len()]), Some(step % 2 == 0)),
            3 => {
                harness.advance((step as u64 * 37) % 150);
            }
            4 => harness.session.hide_cursor(),
            5 => harness.session.show_cursor(),
            _ => {
                harness.advance(BLINK);
            }
        }
        assert!(
            !(harness.session.is_running() && harness.session.is_blinking()),
            "both timers pending after step {step}"
        );
    }
}

#[test]
fn test_start_delay_is_measured_from_creation() {
    let options = Options {
        delay_start_time: Some(50),
        ..quiet()
    };
    let mut harness = Harness::markdown("ab", options);

    assert_eq!(harness.advance(40), 0);
    assert_eq!(harness.session.current_pos(), 0);

    assert_eq!(harness.advance(10), 1);
    assert_eq!(harness.session.current_pos(), 1);
}

#[test]
fn test_updates_before_the_start_delay_do_not_restart_it() {
    let options = Options {
        auto_start: false,
        delay_start_time: Some(50),
        ..quiet()
    };
    let mut harness = Harness::markdown("ab", options);

    harness.advance(20);
    harness.session.update_node(markdown::parse("abc"), None);
    harness.advance(10);
    harness.session.update_node(markdown::parse("abcd"), None);

    assert_eq!(harness.advance(19), 0);
    assert_eq!(harness.advance(1), 1);
    assert_eq!(harness.session.current_pos(), 1);
}

#[test]
fn test_cursor_hidden_after_completion_comes_back_when_typing_resumes() {
    let options = Options {
        hide_cursor_after_complete: true,
        ..with_cursor()
    };
    let mut harness = Harness::markdown("ab", options);

    harness.run_to_idle();
    assert_eq!(harness.last_text(), "ab");
    assert!(!harness.session.options().show_cursor);
    assert!(!harness.session.is_blinking());

    harness.session.update_node(markdown::parse("abc"), None);

    assert!(harness.session.options().show_cursor);
    assert_eq!(harness.last_text(), "ab|");
}

#[test]
fn test_cursor_mark_wraps_the_glyph() {
    let options = Options {
        cursor_mark: Some("cursor".to_string()),
        ..with_cursor()
    };
    let schema = Schema::markdown().with_mark("cursor");
    let mut harness = Harness::with_schema(markdown::parse("ab"), options, schema);

    harness.run_to_idle();
    insta::assert_snapshot!(html::to_html(&harness.last_view()), @r#"<p>ab<span class="cursor">|</span></p>"#);

    harness.advance(BLINK);
    assert_eq!(harness.last_text(), "ab\u{a0}");
}

#[test]
fn test_stop_jumps_to_the_end_once() {
    let doc = markdown::parse("abcdef");
    let mut harness = Harness::new(doc.clone(), quiet());
    harness.advance(0);

    harness.session.stop();
    harness.session.stop();

    assert_eq!(harness.session.current_pos(), doc.content_size());
    assert_eq!(&harness.last_view(), doc.content());
    assert_eq!(harness.completes.get(), 1);
    assert!(!harness.session.is_running());
}

#[test]
fn test_pause_holds_position_until_started_again() {
    let mut harness = Harness::markdown("abcdef", quiet());
    harness.advance(0);
    harness.advance(TICK);
    harness.session.pause();

    harness.advance(100);
    assert_eq!(harness.session.current_pos(), 2);
    assert!(!harness.session.is_running());

    harness.session.start();
    assert_eq!(harness.session.current_pos(), 3);
    assert!(harness.session.is_running());
}

#[test]
fn test_destroyed_session_ignores_everything() {
    let mut harness = Harness::markdown("abc", with_cursor());
    harness.advance(0);
    let views = harness.view_count();

    harness.session.destroy();
    harness.session.destroy();
    harness.session.start();
    harness.session.update_node(markdown::parse("xyz"), Some(true));
    harness.session.stop();

    assert_eq!(harness.advance(1_000), 0);
    assert_eq!(harness.view_count(), views);
    assert_eq!(harness.session.next_deadline(), None);
    assert!(harness.session.is_destroyed());
}

#[test]
fn test_empty_replacement_collapses_to_nothing() {
    let mut harness = Harness::markdown("ab", quiet());
    harness.run_to_idle();

    harness.session.update_node(Node::doc(Fragment::empty()), None);
    harness.run_to_idle();

    assert_eq!(harness.session.current_pos(), 0);
    assert_eq!(harness.session.target_pos(), 0);
    assert_eq!(harness.last_text(), "\u{200B}");
    assert_eq!(harness.completes.get(), 2);
}

#[test]
fn test_removed_listeners_stop_hearing_events() {
    let mut harness = Harness::markdown("ab", quiet());
    let heard = Rc::new(Cell::new(0));
    let counter = heard.clone();
    let id = harness
        .session
        .on(EventKind::View, move |_| counter.set(counter.get() + 1));

    harness.advance(0);
    assert!(harness.session.off(id));
    harness.run_to_idle();

    assert_eq!(heard.get(), 1);
}
