use anyhow::Result;
use api::{Detection, LandmarkSnapshot, LogLevel, ModuleLogger, SourceSettings};
use common::{ConfigStore, IntegrationAdapter, Readout, Session};
use log::{debug, error, info, trace, warn};
use shapekey_d::control::{get_router, ControlHost, ControlState};
use shapekey_d::frame_loop::{FrameEvent, FrameLoop, FrameSlot};
use shapekey_d::shared::read_lock;
use shapekey_d::sources::{load_native_sources, LoadedSource, ReplaySource};
use shapekey_d::strategies;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

extern "C" fn module_log_callback(
    level: LogLevel,
    target: *const std::ffi::c_char,
    message: *const std::ffi::c_char,
) {
    unsafe {
        let target_str = std::ffi::CStr::from_ptr(target)
            .to_str()
            .unwrap_or("unknown");
        let message_str = std::ffi::CStr::from_ptr(message).to_str().unwrap_or("");

        match level {
            LogLevel::Error => error!(target: target_str, "{}", message_str),
            LogLevel::Warn => warn!(target: target_str, "{}", message_str),
            LogLevel::Info => info!(target: target_str, "{}", message_str),
            LogLevel::Debug => debug!(target: target_str, "{}", message_str),
            LogLevel::Trace => trace!(target: target_str, "{}", message_str),
        }
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn find_plugins_dir() -> PathBuf {
    let native = Path::new("plugins/native");
    if !native.exists() {
        let parent_native = Path::new("../plugins/native");
        if parent_native.exists() {
            return parent_native.to_path_buf();
        }
    }
    native.to_path_buf()
}

/// Picks the source that drives frames: a replay file when given, otherwise
/// the configured plugin.
fn select_source(
    replay: Option<String>,
    plugins_dir: &Path,
    active: &str,
) -> Result<Option<LoadedSource>> {
    if let Some(path) = replay {
        info!("Using replay source {:?}", path);
        return Ok(Some(LoadedSource {
            name: "replay".to_string(),
            source: Box::new(ReplaySource::new(path)),
        }));
    }

    let mut sources = load_native_sources(plugins_dir)?;
    if sources.is_empty() {
        warn!("No source plugins loaded!");
        return Ok(None);
    }

    match sources.iter().position(|s| s.name == active) {
        Some(i) => Ok(Some(sources.swap_remove(i))),
        None => {
            warn!(
                "Active source '{}' not found among loaded plugins; using '{}'",
                active, sources[0].name
            );
            Ok(Some(sources.swap_remove(0)))
        }
    }
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    info!("Starting...");
    debug!("Debug logging is active");

    let args: Vec<String> = std::env::args().collect();
    let config_path = arg_value(&args, "--config").unwrap_or_else(|| "config.json".to_string());
    let replay = arg_value(&args, "--replay");
    let plugins_dir = arg_value(&args, "--plugins")
        .map(PathBuf::from)
        .unwrap_or_else(find_plugins_dir);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })?;

    let store = Arc::new(ConfigStore::new(config_path));
    let config = store.load_or_create().unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        common::AppConfig::default()
    });
    info!(
        "Loaded config: target {}, {} group(s)",
        config.target_address(),
        config.groups.len()
    );

    let session = Arc::new(RwLock::new(Session::new(config.clone())));
    let readout = Arc::new(RwLock::new(Readout::default()));

    let control_state = ControlState {
        session: session.clone(),
        readout: readout.clone(),
        store: store.clone(),
    };
    let control_port = config.control_port;
    thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = ControlHost::start(control_port, get_router(control_state)).await {
                error!("Control surface failed: {}", e);
            }
        });
    });

    let mut backend = strategies::create_strategy(&config);
    if let Err(e) = backend.initialize() {
        error!("Failed to initialize output: {}", e);
        return Err(e);
    }
    info!("Output initialized with {:?} mode.", config.output_mode);

    let settings = SourceSettings {
        camera_index: config.camera_index,
    };
    let active = select_source(replay, &plugins_dir, &config.active_source)?.and_then(|mut loaded| {
        let logger_name = format!("shapekey_d::plugins::{}", loaded.name);
        let logger = ModuleLogger::new(module_log_callback, logger_name);
        match loaded.source.initialize(logger, &settings) {
            Ok(()) => {
                info!("✓ Initialized source: {}", loaded.name);
                Some(loaded)
            }
            Err(e) => {
                error!("✗ Failed to initialize source {}: {:#}", loaded.name, e);
                None
            }
        }
    });

    let Some(mut loaded) = active else {
        error!("No landmark source available; frame processing is halted.");
        while running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
        }
        return save_on_exit(&store, &session);
    };

    let slot = Arc::new(FrameSlot::new());
    let frame_loop = FrameLoop::new(backend, session.clone(), readout.clone());
    let running_consumer = running.clone();
    let consumer_slot = slot.clone();
    let consumer = thread::spawn(move || frame_loop.run(consumer_slot, running_consumer));

    info!("Entering Main Loop (Producer)...");

    let target_frame_duration = config.frame_interval();
    if config.max_fps.is_some() && target_frame_duration.is_none() {
        warn!("max_fps {:?} is unusable; frame rate is not capped", config.max_fps);
    }
    let mut last_frame_time = std::time::Instant::now();
    let mut snapshot = LandmarkSnapshot::default();

    while running.load(Ordering::SeqCst) {
        let event = match loaded.source.update(&mut snapshot) {
            Ok(Detection::Face) => FrameEvent::Face(snapshot.clone()),
            Ok(Detection::NoFace) => FrameEvent::NoFace {
                timestamp_ms: snapshot.timestamp_ms,
            },
            Ok(Detection::Pending) => {
                thread::sleep(Duration::from_millis(5));
                continue;
            }
            Err(e) => {
                debug!("Source error, frame dropped: {}", e);
                thread::sleep(Duration::from_millis(5));
                continue;
            }
        };

        if !slot.put(event) || consumer.is_finished() {
            if running.load(Ordering::SeqCst) {
                error!("Frame loop is no longer running; stopping producer");
            }
            break;
        }

        if let Some(target_duration) = target_frame_duration {
            let elapsed = last_frame_time.elapsed();
            if elapsed < target_duration {
                thread::sleep(target_duration - elapsed);
            }
        }
        last_frame_time = std::time::Instant::now();
    }

    info!("Shutting down...");
    loaded.source.unload();
    slot.close();
    if consumer.join().is_err() {
        error!("Frame loop panicked");
    }
    save_on_exit(&store, &session)
}

fn save_on_exit(store: &ConfigStore, session: &RwLock<Session>) -> Result<()> {
    let config = read_lock(session).config.clone();
    if let Err(e) = store.save(&config) {
        error!("Failed to save config: {:#}", e);
    }
    Ok(())
}
