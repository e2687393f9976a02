use clap::{Parser, Subcommand};
use framelab::export::{self, ThemedRenderer};
use framelab::output;
use framelab::photo::{self, Photo};
use framelab::render::text::FontSet;
use framelab::render::RenderEngine;
use framelab::schedule::{Debounce, RenderSequencer, DEFAULT_SETTLE};
use framelab::settings::{GlobalSettings, SettingsError, SettingsStore, MAX_FIX_IMAGE_WIDTH};
use framelab::themes::{
    OptionSchema, OptionStore, OptionValue, ResolvedOptions, ThemeDefinition, ThemeRegistry,
};
use log::warn;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Shared flags for commands that render photos.
#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Theme name (see `framelab themes`); persisted for the next run
    #[arg(long)]
    theme: Option<String>,

    /// Theme option override, `ID=VALUE`; may be repeated
    #[arg(long = "option", value_name = "ID=VALUE")]
    options: Vec<String>,

    /// Encoding quality, 0.1-1.0
    #[arg(long)]
    quality: Option<f32>,

    /// Fixed export width in pixels (proportional height, max 4096)
    #[arg(long)]
    width: Option<u32>,

    /// Aspect ratio to center-crop to, e.g. 4:5 (default: free)
    #[arg(long)]
    ratio: Option<String>,

    /// Always encode to JPEG instead of keeping the source container
    #[arg(long)]
    jpeg: bool,

    /// TTF font file for metadata text (otherwise system fonts are probed)
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "framelab")]
#[command(version)]
#[command(about = "Frame exporter for photographs: themeable borders with EXIF overlays")]
#[command(long_about = "\
Frame exporter for photographs: themeable borders with EXIF overlays

Photos are decoded, their EXIF metadata is normalized once, and each render
composites the photo with a theme's frame geometry and metadata text:

  photo + theme + options + settings  →  framed export image

Themes are a fixed catalog (run 'framelab themes'); each declares typed
options you can override per run with --option ID=VALUE. Display policy
(show/hide maker, model, lens; focal length modes; date notation) and the
export geometry live in the persisted settings file and survive sessions.

Output names follow <base>_<theme>.<ext>; batch export packs everything
into exif_frames_<theme>_<count>photos.zip.")]
struct Cli {
    /// Output directory
    #[arg(long, default_value = "framed", global = true)]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render each photo to its own framed image file
    Render {
        #[command(flatten)]
        args: RenderArgs,
        /// Image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Render a batch and package the results into one zip archive
    Export {
        #[command(flatten)]
        args: RenderArgs,
        /// Image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Interactive preview: re-renders one photo as options change
    Preview {
        #[command(flatten)]
        args: RenderArgs,
        /// The photo to preview
        path: PathBuf,
    },
    /// List every theme with its options, defaults, and constraints
    Themes,
    /// Show where settings are persisted
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render { args, paths } => {
            let session = Session::open(&args)?;
            let report = photo::load_photos(&photo::collect_image_paths(&paths));
            output::print_ingest_report(&report);

            let mut failed = 0usize;
            for photo in &report.photos {
                match export::export_single(
                    &session.renderer(),
                    photo,
                    session.theme().name,
                    &session.settings,
                    &cli.out,
                ) {
                    Ok(path) => println!("Wrote {}", path.display()),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {e}", photo.path.display());
                    }
                }
            }
            if failed > 0 {
                eprintln!("{failed} photo(s) failed to render");
            }
        }
        Command::Export { args, paths } => {
            let session = Session::open(&args)?;
            let report = photo::load_photos(&photo::collect_image_paths(&paths));
            output::print_ingest_report(&report);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    println!("{}", output::format_export_event(&event));
                }
            });
            let batch = export::export_batch(
                &session.renderer(),
                &report.photos,
                session.theme().name,
                &session.settings,
                &cli.out,
                Some(&tx),
            )?;
            drop(tx);
            printer.join().unwrap();
            output::print_batch_summary(&batch, report.photos.len());
        }
        Command::Preview { args, path } => {
            let session = Session::open(&args)?;
            let photo = Photo::load(&path)?;
            run_preview(session, photo, &cli.out)?;
        }
        Command::Themes => {
            output::print_theme_list(ThemeRegistry::builtin().themes());
        }
        Command::Config => {
            let store = SettingsStore::open_default();
            match store.path() {
                Some(path) => println!("{}", path.display()),
                None => println!("settings storage is unavailable (no config directory)"),
            }
        }
    }
    Ok(())
}

/// One run's resolved state: selected theme, options, settings snapshot,
/// and the engine. Renders only ever see these copies.
struct Session {
    registry: ThemeRegistry,
    theme_index: usize,
    option_store: OptionStore,
    options: ResolvedOptions,
    settings: GlobalSettings,
    engine: RenderEngine,
}

impl Session {
    fn open(args: &RenderArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let mut store = SettingsStore::open_default();
        let registry = ThemeRegistry::builtin();

        let previous = store.string("selectedThemeName", "no-frame");
        let requested = args.theme.clone().unwrap_or_else(|| previous.clone());
        // Unknown theme is a state error, fatal for the operation.
        let theme_index = registry.index_of(&requested)?;
        let declared = registry.themes()[theme_index].options.clone();

        let mut option_store = OptionStore::from_map(store.json("themeOptions", BTreeMap::new()));
        if requested != previous {
            // Atomic replace: stale keys are gone before anything resolves.
            option_store.switch_theme(&declared);
            persist(&mut store, |s| s.set_string("selectedThemeName", &requested));
        }
        for spec in &args.options {
            match parse_option_spec(&declared, spec) {
                Ok((id, value)) => option_store.set(id, value),
                Err(message) => warn!("ignoring option {spec:?}: {message}"),
            }
        }
        persist(&mut store, |s| s.set_json("themeOptions", option_store.overrides()));

        let options = ResolvedOptions::resolve(&declared, option_store.overrides());

        let mut settings = GlobalSettings::from_store(&store);
        if let Some(quality) = args.quality {
            settings.quality = quality.clamp(0.1, 1.0);
        }
        if let Some(width) = args.width {
            settings.fix_image_width = width.min(MAX_FIX_IMAGE_WIDTH);
            settings.enable_fix_image_width = true;
        }
        if let Some(ratio) = &args.ratio {
            settings.ratio = ratio.clone();
        }
        if args.jpeg {
            settings.export_to_jpeg = true;
        }

        let font_setting = store.string("fontPath", "");
        let custom_font = args
            .font
            .clone()
            .or_else(|| (!font_setting.is_empty()).then(|| PathBuf::from(font_setting)));
        let engine = RenderEngine::new(FontSet::discover(custom_font.as_deref()));

        Ok(Self {
            registry,
            theme_index,
            option_store,
            options,
            settings,
            engine,
        })
    }

    fn theme(&self) -> &ThemeDefinition {
        &self.registry.themes()[self.theme_index]
    }

    fn renderer(&self) -> ThemedRenderer<'_> {
        ThemedRenderer {
            engine: &self.engine,
            theme: self.theme(),
            options: &self.options,
            settings: &self.settings,
        }
    }
}

/// A failed settings write must not kill the run; the preference is just
/// not saved this time.
fn persist(store: &mut SettingsStore, write: impl FnOnce(&mut SettingsStore) -> Result<(), SettingsError>) {
    if let Err(e) = write(store) {
        warn!("could not persist setting: {e}");
    }
}

/// Parse `ID=VALUE` against the active theme's schema; the value is typed
/// by the declared option kind.
fn parse_option_spec<'a>(
    declared: &'a [OptionSchema],
    spec: &str,
) -> Result<(&'a str, OptionValue), String> {
    let (id, raw) = spec
        .split_once('=')
        .ok_or_else(|| "expected ID=VALUE".to_string())?;
    let schema = declared
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| format!("not declared by the active theme: {id}"))?;
    let value = match &schema.default {
        OptionValue::Number(_) => {
            OptionValue::Number(raw.parse::<f64>().map_err(|e| e.to_string())?)
        }
        OptionValue::Flag(_) => OptionValue::Flag(raw.parse::<bool>().map_err(|e| e.to_string())?),
        OptionValue::Color(_) => OptionValue::Color(raw.to_string()),
        OptionValue::Text(_) => OptionValue::Text(raw.to_string()),
        OptionValue::Choice(_) => OptionValue::Choice(raw.to_string()),
    };
    Ok((schema.id, value))
}

/// Interactive preview loop. Commands on stdin:
///
/// ```text
/// set FRAME_RATIO=0.1      queue an option change
/// theme two-line           switch themes (option replace is atomic)
/// render                   force a render now
/// quit                     exit
/// ```
///
/// Option changes are debounced: a burst of `set` lines inside the settle
/// window produces one render of the final state. Each render is tagged by
/// the sequencer and its result is written only while still current.
fn run_preview(
    mut session: Session,
    photo: Photo,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = std::sync::mpsc::channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    std::fs::create_dir_all(out_dir)?;
    let preview_path = out_dir.join("preview.jpg");
    let mut debounce = Debounce::new(DEFAULT_SETTLE);
    let sequencer = RenderSequencer::new();

    // First paint, before any input arrives.
    debounce.trigger_now(Instant::now());

    println!("preview: set ID=VALUE | theme NAME | render | quit");
    loop {
        let wait = debounce
            .time_remaining(Instant::now())
            .unwrap_or(Duration::from_millis(200));
        match rx.recv_timeout(wait.max(Duration::from_millis(10))) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" {
                    break;
                }
                if line == "render" {
                    debounce.trigger_now(Instant::now());
                } else if let Some(spec) = line.strip_prefix("set ") {
                    let parsed = parse_option_spec(&session.theme().options, spec.trim())
                        .map(|(id, value)| (id.to_string(), value));
                    match parsed {
                        Ok((id, value)) => {
                            session.option_store.set(&id, value);
                            debounce.trigger(Instant::now());
                        }
                        Err(message) => eprintln!("ignored: {message}"),
                    }
                } else if let Some(name) = line.strip_prefix("theme ") {
                    match session.registry.index_of(name.trim()) {
                        Ok(index) => {
                            session.theme_index = index;
                            let declared = session.theme().options.clone();
                            session.option_store.switch_theme(&declared);
                            debounce.trigger(Instant::now());
                        }
                        Err(e) => eprintln!("ignored: {e}"),
                    }
                } else {
                    eprintln!("ignored: unknown command {line:?}");
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if debounce.fire_if_settled(Instant::now()) {
            // Copy-on-trigger: the render works from snapshots taken now.
            let ticket = sequencer.issue();
            let theme = session.theme();
            let options = ResolvedOptions::resolve(&theme.options, session.option_store.overrides());
            match session.engine.render(theme, &photo, &options, &session.settings) {
                Ok(surface) if sequencer.is_current(ticket) => {
                    let bytes = export::encode_image(
                        &surface,
                        export::ExportFormat::Jpeg,
                        session.settings.quality,
                    )?;
                    std::fs::write(&preview_path, bytes)?;
                    println!(
                        "rendered {} ({}x{}) -> {}",
                        theme.name,
                        surface.width(),
                        surface.height(),
                        preview_path.display()
                    );
                }
                Ok(_) => {} // superseded; only the latest result may be shown
                Err(e) => eprintln!("render failed: {e} (adjust options to retry)"),
            }
        }
    }
    Ok(())
}
