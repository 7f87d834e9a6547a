use clap::Parser;
use log::error;
use macroquad::prelude::*;

use chart3d::settings::{self, CliArgs};
use chart3d::viewer::{draw_frame, screen_size, to_mq_color, Viewer};

fn window_conf() -> Conf {
    Conf {
        window_title: "chart3d viewer".to_owned(),
        window_width: 800,
        window_height: 600,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = CliArgs::parse();
    args.init_logging();

    let mut viewer = match settings::load_config_with(&args).and_then(|s| Viewer::from_settings(&s, &args)) {
        Ok(viewer) => viewer,
        Err(err) => {
            error!("{:#}", err);
            return;
        }
    };

    loop {
        clear_background(to_mq_color(viewer.background));
        viewer.handle_input();
        let frame = viewer.render(screen_size());
        draw_frame(&frame);
        draw_text(&viewer.viewpoint.to_string(), 10.0, 20.0, 18.0, DARKGRAY);
        next_frame().await
    }
}
