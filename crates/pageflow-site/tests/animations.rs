//! Entry reveals, parallax and the flag pulse, driven through the step runtime.

use std::time::Duration;

use pageflow_core::fixtures::{demo_control, demo_layout, demo_link};
use pageflow_core::{ControlRole, DomPatch, ElementId, Event, RevealPhase, RevealStyle};
use pageflow_runtime::StepProgram;
use pageflow_site::{SiteConfig, SiteModel};
use pretty_assertions::assert_eq;

fn program() -> StepProgram<SiteModel> {
    let layout = demo_layout();
    let model = SiteModel::with_simulated_transport(SiteConfig::default(), layout.clone(), "")
        .expect("demo layout is valid");
    let mut program = StepProgram::new(model, layout);
    program.init().expect("first init");
    program
}

fn reveal_patches(patches: &[DomPatch]) -> Vec<(u32, RevealStyle, RevealPhase)> {
    patches
        .iter()
        .filter_map(|p| match p {
            DomPatch::Reveal {
                element,
                style,
                phase,
            } => Some((element.get(), *style, *phase)),
            _ => None,
        })
        .collect()
}

#[test]
fn default_targets_start_hidden() {
    let mut p = program();
    let patches = p.take_outputs().patches;
    let reveals = reveal_patches(&patches);
    assert_eq!(reveals.len(), 9);
    assert!(reveals.iter().all(|(_, _, phase)| *phase == RevealPhase::Hidden));
    assert_eq!(reveals[0], (0, RevealStyle::SlideInUp, RevealPhase::Hidden));
    assert_eq!(reveals[8], (8, RevealStyle::SlideInLeft, RevealPhase::Hidden));
    assert!(!reveals.iter().any(|(id, _, _)| *id == 9));
}

#[test]
fn intersection_reveals_once() {
    let mut p = program();
    p.take_outputs();

    p.push_event(Event::Intersect {
        element: ElementId::new(4),
        ratio: 0.05,
    });
    p.step().expect("initialized");
    assert!(p.take_outputs().patches.is_empty());

    p.push_event(Event::Intersect {
        element: ElementId::new(4),
        ratio: 0.4,
    });
    p.step().expect("initialized");
    assert_eq!(
        reveal_patches(&p.take_outputs().patches),
        vec![(4, RevealStyle::SlideInUp, RevealPhase::Revealed)]
    );

    for ratio in [0.0, 1.0] {
        p.push_event(Event::Intersect {
            element: ElementId::new(4),
            ratio,
        });
    }
    p.step().expect("initialized");
    assert!(p.take_outputs().patches.is_empty());
    assert_eq!(
        p.model().reveals().phase(ElementId::new(4)),
        Some(RevealPhase::Revealed)
    );
}

#[test]
fn parallax_is_frame_throttled() {
    let mut p = program();
    p.take_outputs();

    for y in [10.0, 60.0, 120.0] {
        p.push_event(Event::Scroll { y });
    }
    p.step().expect("initialized");
    assert!(p.has_pending_frame());
    assert!(p.take_outputs().patches.is_empty());

    let result = p.frame().expect("initialized");
    assert_eq!(result.messages_processed, 1);
    assert_eq!(
        p.take_outputs().patches,
        vec![DomPatch::BackgroundOffset { offset_px: -60.0 }]
    );
    assert!(!p.has_pending_frame());
}

#[test]
fn parallax_only_on_home() {
    let mut p = program();
    p.push_event(Event::Click {
        control: demo_link(&demo_layout(), ControlRole::PrimaryNav, "places"),
    });
    p.push_event(Event::Scroll { y: 300.0 });
    p.step().expect("initialized");
    p.frame().expect("initialized");
    assert_eq!(p.presented().and_then(|d| d.background_offset), None);
    assert_eq!(p.model().parallax().offset(), None);
}

#[test]
fn flag_click_restarts_pulse() {
    let mut p = program();
    p.take_outputs();
    let flag = demo_control(&demo_layout(), ControlRole::Flag);

    p.push_event(Event::Click { control: flag });
    p.step().expect("initialized");
    assert_eq!(
        p.take_outputs().patches,
        vec![DomPatch::FlagPulse { running: false }]
    );

    p.advance_time(Duration::from_millis(9));
    p.step().expect("initialized");
    assert!(p.take_outputs().patches.is_empty());

    p.advance_time(Duration::from_millis(1));
    p.step().expect("initialized");
    assert_eq!(
        p.take_outputs().patches,
        vec![DomPatch::FlagPulse { running: true }]
    );
}
