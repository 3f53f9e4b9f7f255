//! Tests for the SurfaceRegistry layer stack, visibility and bounds.

use floatshell::host::headless::{HeadlessFactory, HeadlessHost, HeadlessPanel, HeadlessSurface};
use floatshell::host::{SubscriptionSet, SurfaceFactory};
use floatshell::managers::surface_registry::{LayerId, SurfaceRegistry};
use floatshell::types::errors::SurfaceError;
use floatshell::types::geometry::{Rect, Size};
use floatshell::types::layout::{LayoutMode, OverlayMode, PanelKind};

const WINDOW: Size = Size::new(1000.0, 800.0);

fn default_layout() -> LayoutMode {
    LayoutMode {
        fullscreen: false,
        navbar_visible: true,
        overlay_mode: OverlayMode::None,
    }
}

fn registry() -> (HeadlessHost, HeadlessFactory, SurfaceRegistry<HeadlessSurface, HeadlessPanel>) {
    let host = HeadlessHost::new(WINDOW);
    let mut factory = host.factory();
    let navbar = factory.create_panel(PanelKind::Navbar).unwrap();
    let overlay = factory.create_panel(PanelKind::Overlay).unwrap();
    let registry = SurfaceRegistry::new(navbar, overlay, WINDOW, default_layout());
    (host, factory, registry)
}

fn add(factory: &mut HeadlessFactory, registry: &mut SurfaceRegistry<HeadlessSurface, HeadlessPanel>, tab_id: u64) {
    let surface = factory.create_surface("https://example.com").unwrap();
    registry
        .add_content_surface(tab_id, surface, SubscriptionSet::new())
        .unwrap();
}

#[test]
fn test_new_registry_has_only_navbar() {
    let (host, _factory, registry) = registry();

    assert_eq!(registry.layer_stack(), &[LayerId::Navbar]);
    assert_eq!(registry.navbar_bounds(), Rect::new(0.0, 0.0, 1000.0, 38.0));
    assert!(registry.navbar_visible());
    assert_eq!(registry.overlay_bounds(), None);
    assert!(host.panel(PanelKind::Navbar).unwrap().attached);
    assert!(!host.panel(PanelKind::Overlay).unwrap().attached);
}

#[test]
fn test_first_surface_is_visible_and_active() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);

    assert_eq!(registry.active_tab(), Some(1));
    assert!(registry.is_visible(1));
    let record = host.surface(1).unwrap();
    assert!(record.visible);
    assert!(record.attached);
    assert_eq!(record.bounds, Rect::new(0.0, 38.0, 1000.0, 762.0));
}

#[test]
fn test_later_surfaces_start_hidden() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);
    add(&mut factory, &mut registry, 2);

    assert_eq!(registry.active_tab(), Some(1));
    assert!(!registry.is_visible(2));
    assert!(!host.surface(2).unwrap().visible);
    assert_eq!(
        registry.layer_stack(),
        &[LayerId::Content(1), LayerId::Content(2), LayerId::Navbar]
    );
}

#[test]
fn test_duplicate_registration_is_rejected_and_destroyed() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);

    let duplicate = factory.create_surface("https://dup.example").unwrap();
    let result = registry.add_content_surface(1, duplicate, SubscriptionSet::new());

    assert!(matches!(result, Err(SurfaceError::AlreadyRegistered(1))));
    assert_eq!(registry.content_count(), 1);
    assert!(host.surface(2).unwrap().force_destroyed);
}

#[test]
fn test_set_active_swaps_visibility() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);
    add(&mut factory, &mut registry, 2);

    assert!(registry.set_active_tab(2));
    assert!(!registry.set_active_tab(2));

    assert_eq!(registry.visible_content(), vec![2]);
    assert_eq!(host.visible_surfaces(), vec![2]);
    assert_eq!(host.surface(2).unwrap().raise_count, 1);
    assert_eq!(
        registry.layer_stack(),
        &[LayerId::Content(1), LayerId::Content(2), LayerId::Navbar]
    );
}

#[test]
fn test_set_active_unknown_is_rejected() {
    let (_host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);

    assert!(!registry.set_active_tab(9));
    assert_eq!(registry.active_tab(), Some(1));
}

#[test]
fn test_remove_returns_handle_and_clears_active() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);

    let surface = registry.remove_content_surface(1);

    assert_eq!(surface.map(|s| s.serial()), Some(1));
    assert_eq!(registry.active_tab(), None);
    assert_eq!(registry.layer_stack(), &[LayerId::Navbar]);
    assert!(!host.surface(1).unwrap().attached);
    assert!(registry.remove_content_surface(1).is_none());
}

#[test]
fn test_overlay_joins_and_leaves_the_top() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);

    registry.set_overlay_mode(OverlayMode::Settings);
    assert_eq!(registry.layer_stack().last(), Some(&LayerId::Overlay));
    assert_eq!(registry.overlay_bounds(), Some(Rect::new(0.0, 0.0, 1000.0, 800.0)));
    assert!(host.panel(PanelKind::Overlay).unwrap().visible);

    // New content still goes under the navbar and overlay.
    add(&mut factory, &mut registry, 2);
    assert_eq!(
        registry.layer_stack(),
        &[LayerId::Content(1), LayerId::Content(2), LayerId::Navbar, LayerId::Overlay]
    );

    registry.set_overlay_mode(OverlayMode::None);
    assert_eq!(registry.overlay_bounds(), None);
    assert!(!registry.layer_stack().contains(&LayerId::Overlay));
    assert!(!host.panel(PanelKind::Overlay).unwrap().attached);
}

#[test]
fn test_switching_overlay_kind_keeps_one_layer() {
    let (_host, _factory, mut registry) = registry();

    registry.set_overlay_mode(OverlayMode::Search);
    registry.set_overlay_mode(OverlayMode::Settings);

    let overlays = registry
        .layer_stack()
        .iter()
        .filter(|l| **l == LayerId::Overlay)
        .count();
    assert_eq!(overlays, 1);
    assert_eq!(registry.overlay_mode(), OverlayMode::Settings);
}

#[test]
fn test_navbar_mode_relayouts_hidden_surfaces() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);
    add(&mut factory, &mut registry, 2);

    registry.set_navbar_mode(false);

    assert!(!registry.navbar_visible());
    assert_eq!(registry.bounds_of(2), Some(Rect::new(0.0, 0.0, 1000.0, 800.0)));
    assert_eq!(host.surface(2).unwrap().bounds, Rect::new(0.0, 0.0, 1000.0, 800.0));
}

#[test]
fn test_recompute_all_bounds_applies_fullscreen() {
    let (host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);

    let layout = LayoutMode {
        fullscreen: true,
        navbar_visible: true,
        overlay_mode: OverlayMode::DragStrip,
    };
    registry.recompute_all_bounds(Size::new(1280.0, 720.0), layout);

    assert_eq!(registry.layout(), layout);
    assert_eq!(registry.window_size(), Size::new(1280.0, 720.0));
    assert!(!registry.navbar_visible());
    assert_eq!(registry.bounds_of(1), Some(Rect::new(0.0, 0.0, 1280.0, 720.0)));
    assert_eq!(registry.overlay_bounds(), Some(Rect::new(0.0, 0.0, 1280.0, 15.0)));
    assert!(!host.panel(PanelKind::Navbar).unwrap().visible);
}

#[test]
fn test_take_all_content_empties_registry() {
    let (_host, mut factory, mut registry) = registry();
    add(&mut factory, &mut registry, 1);
    add(&mut factory, &mut registry, 2);

    let taken: Vec<u64> = registry.take_all_content().into_iter().map(|(id, _)| id).collect();

    assert_eq!(taken, vec![1, 2]);
    assert_eq!(registry.content_count(), 0);
    assert_eq!(registry.layer_stack(), &[LayerId::Navbar]);
}
