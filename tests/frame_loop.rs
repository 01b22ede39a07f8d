//! Frame loop ordering and per-frame behaviour.

mod common;

use common::{Fakes, GuiAction, Install, input, lock, quit_input, start, start_with};
use raylib::prelude::Vector3;

use islandcore::components::entitykind::EntityKind;
use islandcore::error::GameError;
use islandcore::game::{Game, LoadRequest};
use islandcore::platform::headless::{HeadlessWindow, NullGui, NullRenderer};
use islandcore::platform::{DebugGuiState, FrameInput, Presentation};

const ONE_VILLAGER: &str = r#"engine.create_entity{ kind = "villager", x = 35, z = 35, rotation = 0 }"#;

fn gui(action: impl FnMut(&mut DebugGuiState) + 'static) -> GuiAction {
    Box::new(action)
}

#[test]
fn renderer_sees_entities_after_this_frames_step() {
    let _lock = lock();
    let install = Install::new();
    install.land(1, 0.0, ONE_VILLAGER);
    let mut fakes = Fakes::new();
    fakes.inputs = vec![input(1.0)];
    let (mut game, recorder) = start_with(&install, fakes).unwrap();
    game.load_map("Land 1").unwrap();

    game.frame().unwrap();

    let rec = recorder.borrow();
    assert_eq!(rec.frames.len(), 1);
    let villager = &rec.frames[0][0];
    assert_eq!(villager.kind, EntityKind::Villager);
    // heading 0 walks along +X at the default speed
    assert!((villager.position.x - 37.0).abs() < 1e-4);
    assert!((villager.position.z - 35.0).abs() < 1e-4);
    drop(rec);
    assert_eq!(
        game.entity_registry_mut().positions_of(EntityKind::Villager)[0].x,
        recorder.borrow().frames[0][0].position.x
    );
}

#[test]
fn frame_order_is_poll_render_gui() {
    let _lock = lock();
    let install = Install::new();
    let (mut game, recorder) = start(&install).unwrap();
    game.frame().unwrap();
    game.frame().unwrap();
    assert_eq!(
        recorder.borrow().events,
        ["poll", "render", "gui", "poll", "render", "gui"]
    );
    assert_eq!(game.frame_count(), 2);
}

#[test]
fn gui_load_request_applies_on_next_frame() {
    let _lock = lock();
    let install = Install::new();
    install.land(1, 2.0, ONE_VILLAGER);
    let mut fakes = Fakes::new();
    fakes.gui_actions = vec![gui(|state| {
        state.request = Some(LoadRequest::Map("Land 1".into()));
    })];
    let (mut game, recorder) = start_with(&install, fakes).unwrap();

    game.frame().unwrap();
    assert_eq!(game.active_map(), None);
    assert_eq!(game.pending_load(), Some(&LoadRequest::Map("Land 1".into())));

    game.frame().unwrap();
    assert_eq!(game.active_map(), Some("Land 1"));
    assert!(game.pending_load().is_none());

    let rec = recorder.borrow();
    assert_eq!(rec.land_present, [false, true]);
    assert_eq!(rec.frames[0].len(), 0);
    assert_eq!(rec.frames[1].len(), 1);
    // the second frame's GUI state lists the catalog with availability
    let listed = &rec.gui_states[1].landscapes;
    assert_eq!(listed.len(), 8);
    assert_eq!(listed[0], ("Land 1".to_string(), true));
    assert_eq!(rec.gui_states[1].active_map.as_deref(), Some("Land 1"));
}

#[test]
fn later_request_replaces_earlier_one() {
    let _lock = lock();
    let install = Install::new();
    install.land(1, 0.0, ONE_VILLAGER);
    install.land(2, 7.0, ONE_VILLAGER);
    let (mut game, _) = start(&install).unwrap();

    game.request_map("Land 1");
    game.request_landscape("Land 2");
    game.frame().unwrap();

    assert_eq!(game.active_map(), Some("Land 2"));
    assert_eq!(game.land_island().unwrap().height_at(3.0, 3.0), 7.0);
    assert_eq!(game.entity_registry_mut().len(), 0);
    assert_eq!(game.script().scripts_run(), 0);
}

#[test]
fn failed_deferred_load_keeps_the_world() {
    let _lock = lock();
    let install = Install::new();
    install.land(1, 0.0, ONE_VILLAGER);
    let (mut game, _) = start(&install).unwrap();
    game.load_map("Land 1").unwrap();

    game.request_map("Atlantis");
    game.frame().unwrap();

    assert!(game.is_running());
    assert_eq!(game.active_map(), Some("Land 1"));
    assert!(game.pending_load().is_none());
    assert_eq!(game.entity_registry_mut().len(), 1);
}

#[test]
fn quit_input_ends_run() {
    let _lock = lock();
    let install = Install::new();
    let mut fakes = Fakes::new();
    fakes.inputs = vec![input(0.1), input(0.1), quit_input()];
    let (mut game, recorder) = start_with(&install, fakes).unwrap();

    game.run().unwrap();

    assert!(!game.is_running());
    // the quitting frame still completes
    assert_eq!(game.frame_count(), 3);
    assert_eq!(recorder.borrow().frames.len(), 3);
}

#[test]
fn gui_quit_ends_run() {
    let _lock = lock();
    let install = Install::new();
    let mut fakes = Fakes::new();
    fakes.gui_actions = vec![gui(|_| {}), gui(|state| state.quit = true)];
    let (mut game, _) = start_with(&install, fakes).unwrap();

    game.run().unwrap();
    assert_eq!(game.frame_count(), 2);
}

#[test]
fn update_callback_can_quit() {
    let _lock = lock();
    let install = Install::new();
    install.land(
        1,
        0.0,
        r#"
        local frames = 0
        function on_update(dt)
            frames = frames + 1
            if frames == 4 then engine.quit() end
        end
        "#,
    );
    let (mut game, _) = start(&install).unwrap();
    game.load_map("Land 1").unwrap();

    game.run().unwrap();
    assert_eq!(game.frame_count(), 4);
}

#[test]
fn update_callback_spawns_before_render() {
    let _lock = lock();
    let install = Install::new();
    install.land(
        1,
        0.0,
        r#"
        local spawned = false
        function on_update(dt)
            if not spawned and engine.entity_count() == 0 then
                engine.create_entity{ kind = "tree", x = 10, z = 10 }
                spawned = true
            end
        end
        "#,
    );
    let (mut game, recorder) = start(&install).unwrap();
    game.load_map("Land 1").unwrap();

    game.frame().unwrap();
    game.frame().unwrap();

    let rec = recorder.borrow();
    assert_eq!(rec.frames[0].len(), 1);
    assert_eq!(rec.frames[1].len(), 1);
    assert_eq!(rec.frames[0][0].kind, EntityKind::Tree);
}

#[test]
fn update_callback_sees_active_map() {
    let _lock = lock();
    let install = Install::new();
    install.land(
        1,
        0.0,
        r#"
        function on_update(dt)
            if engine.active_map() == "Land 1" then engine.set_time_of_day(3) end
        end
        "#,
    );
    let (mut game, recorder) = start(&install).unwrap();
    game.load_map("Land 1").unwrap();

    game.frame().unwrap();
    assert_eq!(recorder.borrow().times_of_day[0], 3.0);
}

#[test]
fn update_callback_error_ends_run() {
    let _lock = lock();
    let install = Install::new();
    install.land(1, 0.0, "function on_update(dt) error('boom') end");
    let (mut game, recorder) = start(&install).unwrap();
    game.load_map("Land 1").unwrap();

    let result = game.run();
    assert!(matches!(result, Err(GameError::Script(_))));
    assert!(recorder.borrow().frames.is_empty());
}

#[test]
fn script_landscape_request_is_deferred() {
    let _lock = lock();
    let install = Install::new();
    install.land(
        1,
        0.0,
        r#"
        local asked = false
        function on_update(dt)
            if not asked then
                engine.load_landscape("Data/Landscape/Land2.json")
                asked = true
            end
        end
        "#,
    );
    install.land(2, 6.0, "");
    let (mut game, recorder) = start(&install).unwrap();
    game.load_map("Land 1").unwrap();

    game.frame().unwrap();
    assert_eq!(
        game.pending_load(),
        Some(&LoadRequest::LandscapeFile("Data/Landscape/Land2.json".into()))
    );
    assert_eq!(game.land_island().unwrap().height_at(1.0, 1.0), 0.0);

    game.frame().unwrap();
    assert_eq!(game.land_island().unwrap().height_at(1.0, 1.0), 6.0);
    // a bare terrain swap keeps the map and its script
    assert_eq!(game.active_map(), Some("Land 1"));
    assert!(game.script_vm().unwrap().has_function("on_update"));
    assert_eq!(recorder.borrow().frames.len(), 2);
}

#[test]
fn time_of_day_advances_and_wraps() {
    let _lock = lock();
    let install = Install::new();
    let mut fakes = Fakes::new();
    // day_length 240 s: 10 s is one hour
    fakes.inputs = vec![input(10.0), input(120.0)];
    let (mut game, recorder) = start_with(&install, fakes).unwrap();

    game.frame().unwrap();
    assert!((game.time_of_day() - 13.0).abs() < 1e-4);
    game.frame().unwrap();
    assert!((game.time_of_day() - 1.0).abs() < 1e-4);

    let times = recorder.borrow().times_of_day.clone();
    assert!((times[0] - 13.0).abs() < 1e-4);
    assert!((times[1] - 1.0).abs() < 1e-4);
}

#[test]
fn gui_values_are_normalised() {
    let _lock = lock();
    let install = Install::new();
    let mut fakes = Fakes::new();
    fakes.gui_actions = vec![gui(|state| {
        state.bumpmap_strength = 3.0;
        state.small_bumpmap_strength = -1.0;
        state.time_of_day = 25.5;
        state.wireframe = true;
    })];
    let (mut game, _) = start_with(&install, fakes).unwrap();

    game.frame().unwrap();
    assert_eq!(game.bumpmap_strength(), 1.0);
    assert_eq!(game.small_bumpmap_strength(), 0.0);
    assert!((game.time_of_day() - 1.5).abs() < 1e-4);
    assert!(game.is_wireframe());
    assert!(!game.is_water_debug());
}

#[test]
fn render_error_ends_run() {
    let _lock = lock();
    let install = Install::new();
    let mut fakes = Fakes::new();
    fakes.fail_render_at = Some(2);
    let (mut game, recorder) = start_with(&install, fakes).unwrap();

    let result = game.run();
    assert!(matches!(result, Err(GameError::Window(_))));
    assert_eq!(game.frame_count(), 2);
    assert_eq!(recorder.borrow().frames.len(), 2);

    drop(game);
    let events = recorder.borrow().events.clone();
    assert_eq!(events.last().map(String::as_str), Some("window closed"));
}

#[test]
fn pick_finds_terrain_under_cursor() {
    let _lock = lock();
    let install = Install::new();
    install.land(1, 0.0, "");
    let mut fakes = Fakes::new();
    fakes.inputs = vec![FrameInput {
        dt: 0.1,
        mouse_position: (400, 300),
        pick_requested: true,
        ..FrameInput::default()
    }];
    let (mut game, recorder) = start_with(&install, fakes).unwrap();
    game.load_map("Land 1").unwrap();
    game.camera_mut()
        .look_at(Vector3::new(35.0, 100.0, 85.0), Vector3::new(35.0, 0.0, 35.0));

    game.frame().unwrap();

    let hit = game.intersection().unwrap();
    assert!((hit.x - 35.0).abs() < 1.0);
    assert!((hit.z - 35.0).abs() < 1.0);
    assert_eq!(game.mouse_position(), (400, 300));
    assert_eq!(recorder.borrow().gui_states[0].intersection, Some(hit));
}

#[test]
fn headless_run_stops_after_frame_budget() {
    let _lock = lock();
    let install = Install::new();
    install.land(1, 0.0, ONE_VILLAGER);
    let mut game = Game::new(install.config(), |_| {
        Ok(Presentation::new(
            HeadlessWindow::new(30, 1.0 / 30.0, (800, 600)),
            NullRenderer::default(),
            NullGui,
        ))
    })
    .unwrap();
    game.load_start().unwrap();

    game.run().unwrap();

    assert_eq!(game.frame_count(), 30);
    assert!((game.elapsed() - 1.0).abs() < 1e-3);
    assert!(!game.is_running());
}
