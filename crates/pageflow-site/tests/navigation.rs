//! Router and navigation binder behavior, driven through the step runtime.

use std::time::Duration;

use pageflow_core::fixtures::{DEMO_SECTIONS, demo_control, demo_layout, demo_link};
use pageflow_core::{
    ControlId, ControlRole, Document, DomPatch, Event, HistoryMode, HostEffect, SectionId,
};
use pageflow_runtime::StepProgram;
use pageflow_site::{SiteConfig, SiteModel, SiteMsg};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn program_with(config: SiteConfig, fragment: &str) -> StepProgram<SiteModel> {
    let layout = demo_layout();
    let model = SiteModel::with_simulated_transport(config, layout.clone(), fragment)
        .expect("demo layout is valid");
    let mut program = StepProgram::new(model, layout);
    program.init().expect("first init");
    program
}

fn program(fragment: &str) -> StepProgram<SiteModel> {
    program_with(SiteConfig::default(), fragment)
}

fn presented(program: &StepProgram<SiteModel>) -> &Document {
    program.presented().expect("document presented at init")
}

fn current(program: &StepProgram<SiteModel>) -> Option<&str> {
    program.model().current_section().map(SectionId::as_str)
}

fn click(program: &mut StepProgram<SiteModel>, control: ControlId) {
    program.push_event(Event::Click { control });
    program.step().expect("initialized");
}

fn assert_single_visible(program: &StepProgram<SiteModel>) {
    let doc = presented(program);
    let visible = doc.visible_sections();
    assert_eq!(visible.len(), 1, "visible sections: {visible:?}");
    assert_eq!(Some(visible[0]), program.model().current_section());
}

fn assert_links_track_current(program: &StepProgram<SiteModel>) {
    let doc = presented(program);
    let current = program.model().current_section();
    for spec in program.layout().controls() {
        if !spec.role.is_link() {
            continue;
        }
        assert_eq!(
            doc.is_control_active(spec.id),
            spec.target().as_ref() == current,
            "{:?} link {} (href {:?}) with current {current:?}",
            spec.role,
            spec.id,
            spec.href
        );
    }
}

#[test]
fn initial_fragment_selects_section() {
    let p = program("#symbols");
    assert_eq!(current(&p), Some("symbols"));
    assert_single_visible(&p);
    assert_links_track_current(&p);
}

#[test]
fn empty_or_unknown_initial_fragment_shows_home() {
    for fragment in ["", "#", "#atlantis"] {
        let p = program(fragment);
        assert_eq!(current(&p), Some("home"), "fragment {fragment:?}");
        assert_single_visible(&p);
    }
}

#[test]
fn initial_navigation_requests_no_host_effects() {
    let mut p = program("#places");
    assert!(p.take_outputs().effects.is_empty());
}

#[test]
fn primary_link_click_navigates_and_writes_history() {
    let mut p = program("");
    p.take_outputs();
    let layout = demo_layout();
    click(&mut p, demo_link(&layout, ControlRole::PrimaryNav, "places"));

    assert_eq!(current(&p), Some("places"));
    let out = p.take_outputs();
    assert_eq!(
        out.effects,
        vec![
            HostEffect::ScrollToTop { smooth: true },
            HostEffect::SetFragment {
                fragment: "#places".to_owned(),
                mode: HistoryMode::Replace,
            },
        ]
    );
    assert_eq!(
        &out.patches[..2],
        &[
            DomPatch::SectionVisibility {
                section: SectionId::new("home"),
                visible: false,
            },
            DomPatch::SectionVisibility {
                section: SectionId::new("places"),
                visible: true,
            },
        ]
    );
    assert_links_track_current(&p);
}

#[test]
fn push_history_mode_is_configurable() {
    let mut config = SiteConfig::default();
    config.nav.history = HistoryMode::Push;
    let mut p = program_with(config, "");
    p.send(SiteMsg::NavigateRequested(SectionId::new("history")));
    p.step().expect("initialized");
    assert!(p.take_outputs().effects.contains(&HostEffect::SetFragment {
        fragment: "#history".to_owned(),
        mode: HistoryMode::Push,
    }));
}

#[test]
fn footer_link_navigates() {
    let mut p = program("");
    let layout = demo_layout();
    click(&mut p, demo_link(&layout, ControlRole::FooterNav, "greetings"));
    assert_eq!(current(&p), Some("greetings"));
    assert_links_track_current(&p);
}

#[test]
fn mobile_link_navigates_and_closes_menu() {
    let mut p = program("");
    let layout = demo_layout();
    let toggle = demo_control(&layout, ControlRole::MenuToggle);

    click(&mut p, toggle);
    assert!(presented(&p).mobile_menu_open);
    assert!(presented(&p).is_control_active(toggle));

    click(&mut p, demo_link(&layout, ControlRole::MobileNav, "history"));
    assert_eq!(current(&p), Some("history"));
    assert!(!presented(&p).mobile_menu_open);
    assert!(!presented(&p).is_control_active(toggle));
    assert_links_track_current(&p);
}

#[test]
fn menu_toggle_flips() {
    let mut p = program("");
    let toggle = demo_control(&demo_layout(), ControlRole::MenuToggle);
    click(&mut p, toggle);
    click(&mut p, toggle);
    assert!(!presented(&p).mobile_menu_open);
    assert!(!p.model().nav().menu().is_open());
}

#[test]
fn unknown_section_is_a_no_op() {
    let mut p = program("#symbols");
    p.take_outputs();
    p.send(SiteMsg::NavigateRequested(SectionId::new("atlantis")));
    let result = p.step().expect("initialized");

    assert_eq!(current(&p), Some("symbols"));
    assert_single_visible(&p);
    assert_links_track_current(&p);
    let out = p.take_outputs();
    assert!(out.effects.is_empty());
    assert!(out.patches.is_empty(), "{:?}", out.patches);
    assert_eq!(result.patch_count, 0);
}

#[test]
fn navigate_twice_matches_navigate_once() {
    let mut once = program("");
    once.send(SiteMsg::NavigateRequested(SectionId::new("places")));
    once.step().expect("initialized");

    let mut twice = program("");
    twice.send(SiteMsg::NavigateRequested(SectionId::new("places")));
    twice.send(SiteMsg::NavigateRequested(SectionId::new("places")));
    twice.step().expect("initialized");

    assert_eq!(presented(&once), presented(&twice));
    assert_eq!(current(&once), current(&twice));
}

#[test]
fn history_round_trip() {
    let mut p = program("#home");
    assert_eq!(current(&p), Some("home"));
    p.take_outputs();

    p.push_event(Event::PopState {
        fragment: "#places".to_owned(),
    });
    p.step().expect("initialized");
    assert_eq!(current(&p), Some("places"));
    assert_eq!(
        p.take_outputs().effects,
        vec![HostEffect::ScrollToTop { smooth: true }]
    );
}

#[test]
fn history_to_empty_fragment_goes_home() {
    let mut p = program("#symbols");
    p.push_event(Event::PopState {
        fragment: String::new(),
    });
    p.step().expect("initialized");
    assert_eq!(current(&p), Some("home"));
}

#[test]
fn history_to_unknown_fragment_changes_nothing() {
    let mut p = program("#symbols");
    p.push_event(Event::PopState {
        fragment: "#atlantis".to_owned(),
    });
    p.step().expect("initialized");
    assert_eq!(current(&p), Some("symbols"));
    assert_single_visible(&p);
}

#[test]
fn resize_closes_menu_after_debounce() {
    let mut p = program("");
    let toggle = demo_control(&demo_layout(), ControlRole::MenuToggle);
    click(&mut p, toggle);

    p.push_event(Event::Resize {
        width: 500,
        height: 700,
    });
    p.step().expect("initialized");
    p.advance_time(Duration::from_millis(100));
    p.push_event(Event::Resize {
        width: 900,
        height: 700,
    });
    p.step().expect("initialized");

    p.advance_time(Duration::from_millis(249));
    p.step().expect("initialized");
    assert!(presented(&p).mobile_menu_open, "closed before the debounce window");

    p.advance_time(Duration::from_millis(1));
    p.step().expect("initialized");
    assert!(!presented(&p).mobile_menu_open);
    assert!(!presented(&p).is_control_active(toggle));
}

#[test]
fn narrow_settled_width_keeps_menu_open() {
    let mut p = program("");
    click(&mut p, demo_control(&demo_layout(), ControlRole::MenuToggle));

    p.push_event(Event::Resize {
        width: 900,
        height: 700,
    });
    p.step().expect("initialized");
    p.advance_time(Duration::from_millis(200));
    p.push_event(Event::Resize {
        width: 768,
        height: 700,
    });
    p.step().expect("initialized");
    p.advance_time(Duration::from_secs(1));
    p.step().expect("initialized");
    assert!(presented(&p).mobile_menu_open);
}

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Click(u32),
    Navigate(String),
    Pop(String),
}

fn section_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0usize..DEMO_SECTIONS.len()).prop_map(|i| DEMO_SECTIONS[i].to_owned()),
        1 => "[a-z]{1,8}",
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..16).prop_map(Op::Click),
        section_name().prop_map(Op::Navigate),
        prop_oneof![Just(String::new()), section_name().prop_map(|s| format!("#{s}"))]
            .prop_map(Op::Pop),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn navigation_invariants_hold(ops in proptest::collection::vec(op_strategy(), 1..24)) {
        let mut p = program("");
        for op in ops {
            let known_before = current(&p).map(str::to_owned);
            match &op {
                Op::Click(id) => p.push_event(Event::Click { control: ControlId::new(*id) }),
                Op::Navigate(name) => p.send(SiteMsg::NavigateRequested(SectionId::new(name.as_str()))),
                Op::Pop(fragment) => p.push_event(Event::PopState { fragment: fragment.clone() }),
            }
            p.step().expect("initialized");

            let doc = presented(&p);
            let visible = doc.visible_sections();
            prop_assert_eq!(visible.len(), 1);
            prop_assert_eq!(Some(visible[0]), p.model().current_section());
            for spec in p.layout().controls().iter().filter(|c| c.role.is_link()) {
                prop_assert_eq!(
                    doc.is_control_active(spec.id),
                    spec.target().as_ref() == p.model().current_section()
                );
            }

            if let Op::Navigate(name) = &op {
                if DEMO_SECTIONS.contains(&name.as_str()) {
                    prop_assert_eq!(current(&p), Some(name.as_str()));
                } else {
                    prop_assert_eq!(current(&p).map(str::to_owned), known_before);
                }
            }
        }
    }
}
