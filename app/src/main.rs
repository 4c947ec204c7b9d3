mod config;

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use kagura_core::{
    reload_module, AudioEngine, ConsoleRenderer, EngineHost, FrameDriver, GameInstance,
    HostContext, InputCollector, LoadedModule, NullTextureBackend, ReloadWatcher,
};
use kagura_modules_logging::ConsoleLoggerConfig;

fn main() -> anyhow::Result<()> {
    kagura_modules_logging::init(ConsoleLoggerConfig::from_env())?;

    let config = config::load_or_default(Path::new("config.json"))?;
    log::info!(
        target: "startup",
        "{} {}x{}, module '{}'",
        config.window.title,
        config.window.width,
        config.window.height,
        config.module_path.display()
    );

    // Engine context: built once, threaded explicitly. Window and GPU
    // plumbing stay behind the renderer seams.
    let mut host = EngineHost::new(HostContext::new(
        AudioEngine::new(),
        Box::new(NullTextureBackend),
    ));
    host.ctx_mut().audio.set_runtime_settings(
        config.audio.master,
        config.audio.bgm,
        config.audio.se,
    );

    let mut module = LoadedModule::load(&config.module_path)?;
    let api = host.host_api();
    let mut game = GameInstance::create(module.vtable(), api)?;

    let watcher = if config.watch_module {
        match ReloadWatcher::new(&config.module_path) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!(target: "reload", "watcher unavailable, hot reload disabled: {e}");
                None
            }
        }
    } else {
        None
    };

    let mut driver = FrameDriver::new();
    let mut scene = ConsoleRenderer::default();
    let mut text = ConsoleRenderer::default();
    let mut input = InputCollector::new();

    let frame_duration = Duration::from_secs_f32(1.0 / 60.0);
    let mut generation = 0u64;
    let mut frame_index = 0u64;

    loop {
        if let Some(limit) = config.max_frames {
            if frame_index >= limit {
                log::info!(target: "startup", "frame cap {limit} reached, exiting");
                break;
            }
        }
        let frame_started = Instant::now();

        // Reload is observed at frame boundaries only, never mid-frame.
        if watcher.as_ref().is_some_and(ReloadWatcher::take_pending) {
            match reload_module(
                &mut host,
                &mut module,
                &mut game,
                &config.module_path,
                &mut generation,
            ) {
                Ok(()) => {}
                Err(e) => log::error!(target: "reload", "{e}; previous module keeps running"),
            }
        }

        let snapshot = input.snapshot();
        driver.drive_frame(&mut host, &mut game, &snapshot, &mut scene, &mut text);

        if let Some(fullscreen) = game.consume_fullscreen_request() {
            log::info!(target: "window", "window mode change requested: fullscreen={fullscreen}");
        }

        frame_index += 1;
        let elapsed = frame_started.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    // Teardown order: the game and its module go first, the audio engine
    // shuts down last (track, groups, engine).
    drop(game);
    drop(module);
    host.ctx_mut().audio.shutdown();
    Ok(())
}
