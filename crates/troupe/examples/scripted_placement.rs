//! Scripted placement: drives the placer headlessly.
//!
//! Sweeps the cursor across the screen, cycles through the three groups and
//! places one of each, then lets them rise out of view.
//!
//! Pass a config path to override the defaults:
//!
//! ```text
//! cargo run --example scripted_placement -- crates/troupe/assets/troupe.json
//! ```

use troupe::prelude::*;

const FRAME: Duration = Duration::from_millis(16);

enum Step {
    Cursor(f32, f32),
    Key(KeyCode),
    Click,
    Wait(u32),
}

fn main() {
    troupe::diag::init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => match PlacerConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => PlacerConfig::default(),
    };
    let plugin = match PlacerPlugin::from_config(config) {
        Ok(plugin) => plugin,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut app = App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(plugin)
        .add_system(report_rising);

    let script = [
        Step::Cursor(320.0, 600.0),
        Step::Wait(2),
        Step::Click,
        Step::Wait(10),
        Step::Key(KeyCode::KeyS),
        Step::Cursor(640.0, 500.0),
        Step::Click,
        Step::Wait(10),
        Step::Key(KeyCode::KeyD),
        Step::Cursor(960.0, 650.0),
        Step::Click,
        Step::Wait(150),
    ];

    for step in script {
        match step {
            Step::Cursor(x, y) => app.world.insert_resource(CursorPosition::new(x, y)),
            Step::Key(key) => app.world.resource_mut::<Input<KeyCode>>().tap(key),
            Step::Click => app
                .world
                .resource_mut::<Input<MouseButton>>()
                .tap(MouseButton::Left),
            Step::Wait(frames) => {
                for _ in 0..frames {
                    app.update(FRAME);
                }
                continue;
            }
        }
        app.update(FRAME);
    }

    let placer = app.world.resource::<CharacterPlacer>();
    log::info!(
        "Done after {} frames: {} entities left, previewing {}",
        app.world.resource::<Time>().frame_count(),
        app.world.entity_count(),
        placer.current_group()
    );
}

/// Log how many units are still in the air, once per simulated second.
fn report_rising(world: &mut World) {
    let frame = world.resource::<Time>().frame_count();
    if frame % 60 != 0 {
        return;
    }
    let rising = world
        .characters()
        .into_iter()
        .filter(|&e| {
            world
                .character(e)
                .and_then(Character::as_leaf)
                .is_some_and(CharacterLeaf::is_rising)
        })
        .count();
    log::info!("frame {frame}: {rising} unit(s) rising");
}
