use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use hsv_picker::{sample_color, ImageRegistry, PickerSettings};

const USAGE: &str = "usage: pick_color <image> <x> <y> [display_width display_height] [--settings file.json]";

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let settings = match args.iter().position(|a| a == "--settings") {
        Some(i) => {
            let path = args.get(i + 1).cloned().context(USAGE)?;
            args.drain(i..i + 2);
            PickerSettings::load(&PathBuf::from(&path))
                .with_context(|| format!("Failed to load settings from {}", path))?
        }
        None => PickerSettings::default(),
    };

    if args.len() != 3 && args.len() != 5 {
        bail!(USAGE);
    }

    let path = PathBuf::from(&args[0]);
    let x: f64 = args[1].parse().with_context(|| format!("bad x: {}", args[1]))?;
    let y: f64 = args[2].parse().with_context(|| format!("bad y: {}", args[2]))?;

    let data = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let registry = ImageRegistry::with_settings(settings);
    let registered = hsv_picker::register_image(&registry, &data)?;
    log::info!(
        "Registered {} as {} ({}x{})",
        path.display(),
        registered.id,
        registered.width,
        registered.height
    );

    let (display_width, display_height) = if args.len() == 5 {
        (
            args[3].parse().with_context(|| format!("bad display width: {}", args[3]))?,
            args[4].parse().with_context(|| format!("bad display height: {}", args[4]))?,
        )
    } else {
        (registered.width as f64, registered.height as f64)
    };

    let reading = sample_color(&registry, registered.id.as_str(), x, y, display_width, display_height)?;

    let output = serde_json::json!({
        "image": registered,
        "reading": reading,
        "suggested_range": reading.suggested_range(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
