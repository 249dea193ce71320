//! Hybrid viewer - renders a demo scenegraph through the hybrid compositor.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use common::color::Color;
use common::geometry::Point;
use compositor::{HybridRenderer, RoutingHandle};
use render::{Renderer, ResourceLoader, SurfaceKind, SurfaceTree};
use viewer::{demo_scene, ViewerConfig, VERSION};

/// Hybrid viewer - composites a vector and a raster backend into one output
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Content width in logical pixels
    #[arg(long, default_value = "640")]
    width: f32,

    /// Content height in logical pixels
    #[arg(long, default_value = "480")]
    height: f32,

    /// Device pixel ratio
    #[arg(long, default_value = "1.0")]
    scale: f32,

    /// Background color (hex or named)
    #[arg(long, default_value = "white")]
    background: String,

    /// Mark types drawn by the vector backend
    #[arg(long, value_delimiter = ',', default_value = "text")]
    vector_marks: Vec<String>,

    /// Stack the two surfaces for inspection instead of overlaying them
    #[arg(long)]
    debug_layering: bool,

    /// Output path for the raster surface
    #[arg(long, default_value = "raster.png")]
    raster_output: String,

    /// Output path for the vector surface
    #[arg(long, default_value = "vector.svg")]
    vector_output: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<ViewerConfig> {
        let background = Color::parse(&self.background)
            .ok_or_else(|| anyhow!("unrecognized background color: {}", self.background))?;

        Ok(ViewerConfig {
            width: self.width,
            height: self.height,
            scale: self.scale,
            background,
            vector_marks: self.vector_marks,
            debug_layering: self.debug_layering,
            raster_output: self.raster_output,
            vector_output: self.vector_output,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Hybrid viewer v{}", VERSION);

    let config = args.into_config()?;
    let (vector_marks, unknown) = config.parse_vector_marks();
    for name in unknown {
        warn!("unrecognized mark type: {name} (routed to the raster backend)");
    }

    let routing = RoutingHandle::default();
    routing.set(vector_marks.iter_marks(), config.debug_layering);

    // One window surface hosts the compositor's layered output.
    let mut tree = SurfaceTree::new();
    let window = tree.create_surface(SurfaceKind::Group);
    tree.set_root(window);
    let surfaces = tree.into_shared();

    let loader = Arc::new(ResourceLoader::new());
    let mut renderer = HybridRenderer::with_routing(loader, routing);
    renderer.initialize(
        &surfaces,
        window,
        config.width,
        config.height,
        Point::ZERO,
        config.scale,
    )?;
    renderer.background(config.background);

    let scene = demo_scene(config.width, config.height);
    renderer.render(&scene)?;

    let stats = renderer.stats();
    info!(
        vector_items = stats.vector_items,
        raster_items = stats.raster_items,
        "scene rendered in {:.2} ms",
        stats.draw_time_ms
    );

    // Export the raster surface.
    let buffer = renderer.raster().buffer();
    let img = image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.as_bytes().to_vec())
        .ok_or_else(|| anyhow!("raster buffer size mismatch"))?;
    img.save(&config.raster_output)?;
    info!("raster surface written to {}", config.raster_output);

    // Export the vector surface.
    let svg = renderer.vector().doc().to_svg(config.width, config.height);
    std::fs::write(&config.vector_output, svg)?;
    info!("vector surface written to {}", config.vector_output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["hybrid-viewer"]);
        assert_eq!(args.width, 640.0);
        assert_eq!(args.vector_marks, vec!["text".to_string()]);
        assert!(!args.debug_layering);
    }

    #[test]
    fn test_args_vector_marks_list() {
        let args = Args::parse_from(["hybrid-viewer", "--vector-marks", "text,rule"]);
        assert_eq!(args.vector_marks, vec!["text".to_string(), "rule".to_string()]);
    }

    #[test]
    fn test_args_bad_background() {
        let args = Args::parse_from(["hybrid-viewer", "--background", "nope"]);
        assert!(args.into_config().is_err());
    }
}
