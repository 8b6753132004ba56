use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use hsv_picker::{analyze_ripeness, register_image, ImageRegistry};

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: ripeness_report <image>...");
    }

    let registry = ImageRegistry::new();
    for path in &paths {
        let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let registered = match register_image(&registry, &data) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let report = analyze_ripeness(&registry, registered.id.as_str())?;
        let output = serde_json::json!({
            "file": path.display().to_string(),
            "image": registered,
            "ripeness": report,
        });
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}
