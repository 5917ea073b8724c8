use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use clap::{Parser, Subcommand};
use control_surface_core::{
    Address, Color, Control, ControlSet, EventKind, MemorySurface, Momentary, Navigator, Radio,
    RawEvent, Surface, SurfaceLayout, Toggle, View, ViewSet, VirtualFader,
};
use tracing_subscriber::EnvFilter;

fn main() -> control_surface_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { layout, script } => run_demo(layout.as_deref(), script.as_deref()),
        Commands::Color { spec } => run_color(&spec),
    }
}

fn run_demo(layout: Option<&Path>, script: Option<&Path>) -> control_surface_core::Result<()> {
    let layout = match layout {
        Some(path) => SurfaceLayout::load(path)?,
        None => SurfaceLayout::default(),
    };
    tracing::info!(surface = %layout.name, "starting demo");

    let events = match script {
        Some(path) => load_script(path)?,
        None => builtin_script(),
    };

    let mut views = ViewSet::new(layout.memory_surface());
    let main_view = build_views(&views.navigator())?;

    views.push(Rc::clone(&main_view))?;
    views.surface_mut().queue_all(events);
    let handled = views.dispatch()?;
    tracing::info!(handled, "replayed script");

    // SESSION opens the overlay, USER1 closes it again.
    views.surface_mut().queue(Address::new("MODE", "SESSION"), 127);
    views.surface_mut().queue(Address::new("NAV", "LEFT"), 127);
    views.surface_mut().queue(Address::new("MODE", "USER1"), 127);
    views.dispatch()?;
    views.pop(Some(&main_view))?;

    report(views.surface());
    Ok(())
}

fn run_color(spec: &str) -> control_surface_core::Result<()> {
    let color = Color::parse(spec)?;
    tracing::info!(%color, "parsed color");
    println!("{}", serde_json::to_string_pretty(&color)?);
    Ok(())
}

/// Main view with a button that opens an overlay sharing the navigation
/// radio.
fn build_views(navigator: &Navigator) -> control_surface_core::Result<Rc<View>> {
    let nav = Control::new("nav", ControlSet::group("NAV"), Radio::new());
    let toggles = Control::new(
        "toggles",
        ControlSet::grid(0, 0, 6, 0),
        Toggle::new(3, ["off", "green", "red"])?,
    );
    let level = Control::new(
        "level",
        ControlSet::grid(7, 0, 7, 7),
        VirtualFader::new(["green", "yellow", "red"])?.per_position_colors(true),
    );
    let side = Control::new("side", ControlSet::group("SIDE"), Momentary::new("orange", "off")?);
    let open = Control::new(
        "open",
        ControlSet::addresses([Address::new("MODE", "SESSION")]),
        Momentary::new("green", "off")?,
    );
    let close = Control::new(
        "close",
        ControlSet::addresses([Address::new("MODE", "USER1")]),
        Momentary::new("red flash", "off")?,
    );

    log_events(&nav, &[EventKind::Radio]);
    log_events(&toggles, &[EventKind::Toggle]);
    log_events(&level, &[EventKind::Change, EventKind::Min, EventKind::Max]);
    log_events(&side, &[EventKind::Press, EventKind::Release]);
    log_events(&close, &[EventKind::Press]);

    let back = navigator.clone();
    close.on(EventKind::Press, move |_, _| {
        back.pop(None);
        Ok(())
    });

    let nav = nav.shared();
    let overlay = View::new("overlay", [close.shared(), Rc::clone(&nav)]).shared();

    let forward = navigator.clone();
    open.on(EventKind::Press, move |_, _| {
        forward.push(Rc::clone(&overlay));
        Ok(())
    });

    let main_view = View::new(
        "main",
        [nav, toggles.shared(), level.shared(), side.shared(), open.shared()],
    );
    Ok(main_view.shared())
}

fn log_events(control: &Control, kinds: &[EventKind]) {
    for kind in kinds {
        control.on(*kind, |_, emission| {
            tracing::info!(
                control = emission.control,
                address = %emission.address,
                event = ?emission.event,
                "event"
            );
            Ok(())
        });
    }
}

fn load_script(path: &Path) -> control_surface_core::Result<Vec<RawEvent>> {
    tracing::info!(?path, "loading input script");
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn builtin_script() -> Vec<RawEvent> {
    let press = |address: Address| {
        [
            RawEvent::new(address.clone(), 127),
            RawEvent::new(address, 0),
        ]
    };

    [
        press(Address::new("NAV", "DOWN")),
        press(Address::cell(0, 0)),
        press(Address::cell(0, 0)),
        press(Address::cell(3, 0)),
        press(Address::cell(7, 0)),
        press(Address::cell(7, 4)),
        press(Address::cell(7, 7)),
        press(Address::new("SIDE", "MUTE")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn report(surface: &MemorySurface) {
    for address in surface.catalog().addresses(&[]) {
        match surface.color(&address) {
            Some(spec) if spec != "off" => tracing::info!(%address, spec, "lit"),
            _ => {}
        }
    }
    tracing::info!(writes = surface.writes().len(), "demo finished");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Control surface engine demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay raw input against an in-memory surface and log the reactions.
    Demo {
        /// JSON surface layout; a generic 8x8 pad when omitted.
        #[arg(short, long)]
        layout: Option<PathBuf>,
        /// JSON array of `{group, control, value}` input events.
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
    /// Parse a color specification and print it as JSON.
    Color {
        /// Specification such as `red@2 flash` or `#00ff00`.
        spec: String,
    },
}
