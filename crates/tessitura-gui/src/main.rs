//! tessitura demo host binary

mod app;

use app::TessituraApp;
use eframe::NativeOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tessitura=debug".parse().unwrap())
                .add_directive("wgpu=warn".parse().unwrap())
                .add_directive("eframe=warn".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting Tessitura");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 640.0])
            .with_min_inner_size([700.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tessitura",
        options,
        Box::new(|cc| Ok(Box::new(TessituraApp::new(cc)))),
    )
}
