//! Property-based tests for tab operations on the lifecycle manager.
//!
//! For any sequence of creates, closes, switches and layout changes, the tab
//! directory and the surface registry hold the same tabs, exactly one surface is
//! visible when a tab exists, and that surface belongs to the active tab.

use std::time::Duration;

use floatshell::host::headless::{HeadlessHost, ManualClock};
use floatshell::managers::lifecycle_manager::{LifecycleConfig, LifecycleManager};
use floatshell::types::command::Command;
use floatshell::types::geometry::Size;
use floatshell::types::layout::OverlayMode;
use proptest::prelude::*;

/// Operations a user can throw at the shell.
#[derive(Debug, Clone)]
enum TabOp {
    Create,
    CreateBackground,
    Close(usize), // index into the current tab order
    Switch(usize),
    Next,
    ToggleNavbar,
    ToggleFullscreen,
    ToggleDetached,
    Overlay(u8),
}

/// Biased toward creates so sequences build up interesting state.
fn arb_tab_ops() -> impl Strategy<Value = Vec<TabOp>> {
    prop::collection::vec(
        prop_oneof![
            4 => Just(TabOp::Create),
            1 => Just(TabOp::CreateBackground),
            3 => (0..20usize).prop_map(TabOp::Close),
            3 => (0..20usize).prop_map(TabOp::Switch),
            1 => Just(TabOp::Next),
            1 => Just(TabOp::ToggleNavbar),
            1 => Just(TabOp::ToggleFullscreen),
            1 => Just(TabOp::ToggleDetached),
            1 => (0..3u8).prop_map(TabOp::Overlay),
        ],
        1..60,
    )
}

fn overlay(n: u8) -> OverlayMode {
    match n {
        0 => OverlayMode::None,
        1 => OverlayMode::Search,
        _ => OverlayMode::Settings,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn directory_and_registry_stay_in_step(ops in arb_tab_ops()) {
        let host = HeadlessHost::new(Size::new(1000.0, 800.0));
        let clock = ManualClock::new();
        let mut manager = LifecycleManager::new(
            host.factory(),
            host.window(),
            Box::new(clock.clone()),
            LifecycleConfig::default(),
        )
        .unwrap();
        let mut expected_count = 0usize;

        for op in &ops {
            let order: Vec<u64> = manager.tabs().iter().map(|t| t.id).collect();
            match op {
                TabOp::Create => {
                    let id = manager.create_tab("https://example.com").unwrap();
                    prop_assert_eq!(manager.active_tab_id(), Some(id));
                    expected_count += 1;
                }
                TabOp::CreateBackground => {
                    let before = manager.active_tab_id();
                    let id = manager.create_background_tab("https://example.org").unwrap();
                    prop_assert_eq!(manager.active_tab_id(), before.or(Some(id)));
                    expected_count += 1;
                }
                TabOp::Close(idx) => {
                    if order.is_empty() {
                        continue;
                    }
                    manager.close_tab(order[idx % order.len()]);
                    expected_count -= 1;
                }
                TabOp::Switch(idx) => {
                    if order.is_empty() {
                        continue;
                    }
                    let target = order[idx % order.len()];
                    manager.switch_tab(target);
                    prop_assert_eq!(manager.active_tab_id(), Some(target));
                }
                TabOp::Next => manager.execute(Command::NextTab).unwrap(),
                TabOp::ToggleNavbar => manager.execute(Command::ToggleNavBar).unwrap(),
                TabOp::ToggleFullscreen => manager.execute(Command::ToggleFullscreen).unwrap(),
                TabOp::ToggleDetached => manager.execute(Command::ToggleDetachedMode).unwrap(),
                TabOp::Overlay(n) => manager
                    .execute(Command::SetOverlayMode { mode: overlay(*n) })
                    .unwrap(),
            }

            clock.advance(Duration::from_millis(2100));
            manager.tick();

            prop_assert_eq!(manager.tabs().len(), expected_count, "after {:?}", op);

            let mut directory: Vec<u64> = manager.tabs().iter().map(|t| t.id).collect();
            let mut registry = manager.registry().content_ids();
            directory.sort_unstable();
            registry.sort_unstable();
            prop_assert_eq!(&directory, &registry);

            prop_assert_eq!(host.live_surfaces().len(), expected_count, "closed surfaces must be released");

            match manager.active_tab_id() {
                None => prop_assert!(manager.tabs().is_empty()),
                Some(active) => {
                    prop_assert_eq!(manager.registry().active_tab(), Some(active));
                    prop_assert_eq!(manager.registry().visible_content(), vec![active]);
                }
            }
        }
    }
}
