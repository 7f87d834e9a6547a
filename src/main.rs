use std::path::Path;

use anyhow::Result;
use clap::Parser;
use log::info;

use chart3d::export;
use chart3d::render::Renderer;
use chart3d::scene;
use chart3d::settings::{self, CliArgs, OutputFormat};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    args.init_logging();

    let settings = settings::load_config_with(&args)?;

    let scene = match &settings.scene {
        Some(path) => scene::load_scene(Path::new(path))?,
        None => {
            info!("no scene given, rendering the demo chart");
            scene::demo_scene()
        }
    };

    let mut viewpoint = settings.resolve_viewpoint(&args, scene.view);
    let world = scene.into_world();
    let renderer = Renderer::from_settings(&settings);
    let canvas = settings.canvas();

    if settings.zoom_to_fit {
        viewpoint = renderer.zoom_to_fit(&world, &viewpoint, canvas, settings.fit_margin);
    }

    let frame = renderer.render(&world, &viewpoint, canvas);
    println!("{}", frame.stats);

    let output = Path::new(&settings.output);
    match settings.format {
        OutputFormat::Svg => export::write_svg(output, &frame, canvas, settings.background)?,
        OutputFormat::Json => export::write_json(output, &frame)?,
    }

    Ok(())
}
