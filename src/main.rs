//! Headless tour driver: opens the first tour of a catalog and reports what
//! would be on screen.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::main()
}

// The driver reads media from disk and loads on a worker thread
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use std::sync::Arc;
    use std::time::Duration;

    use glam::Vec3;
    use vrtour::GalleryError;
    use vrtour::ViewerConfig;
    use vrtour::color_utils::rgba_to_f32;
    use vrtour::constants::LOADER_THREAD_NAME;
    use vrtour::hotspot::{HotspotPlacer, HotspotVisual, IconRegistry};
    use vrtour::loader::{FileSource, PanoramaLoader, ThreadExecutor};
    use vrtour::model::{Catalog, CategoryKind};
    use vrtour::tour::{TourListener, TourNavigator, TourState};

    const POLL_INTERVAL: Duration = Duration::from_millis(10);
    const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

    /// Reports tour events through the log.
    struct LogListener;

    impl TourListener for LogListener {
        fn on_navigate(&mut self, node_id: &str) {
            log::info!("Navigated to '{}'", node_id);
        }

        fn on_tour_exit(&mut self) {
            log::info!("Tour closed");
        }

        fn on_load_error(&mut self, error: &GalleryError) {
            if error.is_recoverable() {
                log::warn!("Tour load failed: {}", error);
            } else {
                log::error!("Tour load failed: {}", error);
            }
        }
    }

    pub fn main() -> ExitCode {
        let config = ViewerConfig::load_from_default_path().unwrap_or_default();
        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let mut args = std::env::args().skip(1);
        let Some(catalog_path) = args.next().map(PathBuf::from) else {
            eprintln!("usage: vrtour-native <catalog.json> [media-root]");
            return ExitCode::from(2);
        };
        let media_root = args
            .next()
            .map(PathBuf::from)
            .or_else(|| config.media.media_root.clone())
            .unwrap_or_else(|| catalog_dir(&catalog_path));

        match run(&config, &catalog_path, media_root) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        }
    }

    fn catalog_dir(catalog_path: &Path) -> PathBuf {
        catalog_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn run(config: &ViewerConfig, catalog_path: &Path, media_root: PathBuf) -> Result<(), String> {
        let catalog = Catalog::from_path(catalog_path).map_err(|e| e.to_string())?;
        for category in catalog.visible_categories() {
            println!(
                "[{}] {} ({} items)",
                category.kind.tag(),
                category.name,
                category.items.len()
            );
        }

        let Some(tour) = catalog
            .visible_categories()
            .find(|c| c.kind == CategoryKind::Tour)
        else {
            log::info!("Catalog has no tour categories");
            return Ok(());
        };

        let mut icons = IconRegistry::new();
        if let Some(icon_dir) = &config.media.icon_dir {
            match icons.load_dir(icon_dir) {
                Ok(count) => log::info!("Registered {} icons from {:?}", count, icon_dir),
                Err(e) => log::warn!("Could not load icons: {}", e),
            }
        }

        let executor = ThreadExecutor::spawn(LOADER_THREAD_NAME)?;
        let loader = PanoramaLoader::new(Arc::new(executor), Arc::new(FileSource::new(media_root)));
        let placer = HotspotPlacer::new(icons, config.placement.clone());
        let mut navigator =
            TourNavigator::new(loader, placer, Vec3::ZERO).with_listener(LogListener);

        navigator.start_tour(tour).map_err(|e| e.to_string())?;

        let started = web_time::Instant::now();
        while matches!(navigator.state(), TourState::Loading { .. }) {
            if started.elapsed() > LOAD_TIMEOUT {
                return Err(format!("Timed out loading tour '{}'", tour.name));
            }
            if !navigator.poll() {
                std::thread::sleep(POLL_INTERVAL);
            }
        }

        let TourState::Displaying { node } = navigator.state() else {
            return Err(format!("Tour '{}' could not be opened", tour.name));
        };
        println!("Displaying '{}' of tour '{}'", node, tour.name);
        for hotspot in navigator.stage().hotspots() {
            let content = match &hotspot.visual {
                HotspotVisual::Icon(icon) => format!("icon {}", icon.name),
                HotspotVisual::Marker => "marker".to_string(),
                HotspotVisual::Text { text, color, .. } => {
                    format!("text {:?} color {:?}", text, rgba_to_f32(*color))
                }
            };
            println!(
                "  #{} {} at {:?} -> {}",
                hotspot.source_index,
                content,
                hotspot.position,
                hotspot.target.as_deref().unwrap_or("-")
            );
        }

        navigator.exit();
        Ok(())
    }
}
