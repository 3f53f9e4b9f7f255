//! Property-based tests for the bounds calculator and navbar relayout.

use floatshell::host::headless::{HeadlessHost, ManualClock};
use floatshell::managers::lifecycle_manager::{LifecycleConfig, LifecycleManager};
use floatshell::services::bounds_calculator::{
    calculate_content_bounds, calculate_navbar_bounds, calculate_overlay_bounds,
};
use floatshell::types::command::Command;
use floatshell::types::geometry::{Rect, Size};
use floatshell::types::layout::{LayoutMode, OverlayMode};
use proptest::prelude::*;

fn arb_overlay() -> impl Strategy<Value = OverlayMode> {
    prop_oneof![
        Just(OverlayMode::None),
        Just(OverlayMode::Settings),
        Just(OverlayMode::Search),
        Just(OverlayMode::DragStrip),
    ]
}

fn arb_layout() -> impl Strategy<Value = LayoutMode> {
    (any::<bool>(), any::<bool>(), arb_overlay()).prop_map(|(fullscreen, navbar_visible, overlay_mode)| {
        LayoutMode { fullscreen, navbar_visible, overlay_mode }
    })
}

fn within(rect: Rect, window: Size) -> bool {
    let w = window.width.max(0.0);
    let h = window.height.max(0.0);
    rect.x >= 0.0
        && rect.y >= 0.0
        && rect.width >= 0.0
        && rect.height >= 0.0
        && rect.x + rect.width <= w + 1e-9
        && rect.y + rect.height <= h + 1e-9
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn bounds_are_never_negative_and_fit_the_window(
        width in -200.0f64..4000.0,
        height in -200.0f64..4000.0,
        layout in arb_layout(),
    ) {
        let window = Size::new(width, height);
        let navbar = calculate_navbar_bounds(window, &layout);
        let content = calculate_content_bounds(window, &layout);

        prop_assert!(within(navbar, window));
        prop_assert!(within(content, window));
        if let Some(overlay) = calculate_overlay_bounds(window, &layout) {
            prop_assert!(within(overlay, window));
        }
    }

    #[test]
    fn navbar_and_content_tile_the_height(
        width in 0.0f64..4000.0,
        height in 0.0f64..4000.0,
        layout in arb_layout(),
    ) {
        let window = Size::new(width, height);
        let navbar = calculate_navbar_bounds(window, &layout);
        let content = calculate_content_bounds(window, &layout);

        prop_assert_eq!(content.y, navbar.height);
        prop_assert!((navbar.height + content.height - height).abs() < 1e-9);
        prop_assert_eq!(content.width, width);
    }

    #[test]
    fn fullscreen_collapses_navbar(
        width in 0.0f64..4000.0,
        height in 0.0f64..4000.0,
        navbar_visible in any::<bool>(),
        overlay_mode in arb_overlay(),
    ) {
        let layout = LayoutMode { fullscreen: true, navbar_visible, overlay_mode };
        let window = Size::new(width, height);

        prop_assert_eq!(calculate_navbar_bounds(window, &layout).height, 0.0);
        prop_assert_eq!(calculate_content_bounds(window, &layout), Rect::new(0.0, 0.0, width, height));
    }

    #[test]
    fn no_overlay_means_no_bounds(
        width in 0.0f64..4000.0,
        height in 0.0f64..4000.0,
        fullscreen in any::<bool>(),
        navbar_visible in any::<bool>(),
    ) {
        let layout = LayoutMode { fullscreen, navbar_visible, overlay_mode: OverlayMode::None };
        prop_assert_eq!(calculate_overlay_bounds(Size::new(width, height), &layout), None);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    #[test]
    fn navbar_toggle_round_trip_restores_bounds(
        width in 200.0f64..3000.0,
        height in 200.0f64..3000.0,
        tabs in 1usize..5,
    ) {
        let host = HeadlessHost::new(Size::new(1000.0, 800.0));
        let mut manager = LifecycleManager::new(
            host.factory(),
            host.window(),
            Box::new(ManualClock::new()),
            LifecycleConfig::default(),
        )
        .unwrap();
        for _ in 0..tabs {
            manager.create_tab("https://example.com").unwrap();
        }
        host.set_window_size(Size::new(width, height));
        manager.execute(Command::WindowResized).unwrap();

        let ids: Vec<u64> = manager.tabs().iter().map(|t| t.id).collect();
        let before: Vec<Option<Rect>> = ids.iter().map(|id| manager.registry().bounds_of(*id)).collect();
        let navbar_before = manager.registry().navbar_bounds();

        manager.execute(Command::ToggleNavBar).unwrap();
        for id in &ids {
            prop_assert_eq!(
                manager.registry().bounds_of(*id),
                Some(Rect::new(0.0, 0.0, width, height))
            );
        }
        manager.execute(Command::ToggleNavBar).unwrap();

        let after: Vec<Option<Rect>> = ids.iter().map(|id| manager.registry().bounds_of(*id)).collect();
        prop_assert_eq!(after, before);
        prop_assert_eq!(manager.registry().navbar_bounds(), navbar_before);
        prop_assert_eq!(manager.registry().overlay_mode(), OverlayMode::None);
    }
}
