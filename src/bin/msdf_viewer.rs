use anyhow::Context;
use msdf_text_bench::app::run_viewer;
use msdf_text_bench::ViewerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            ViewerConfig::load(&path).with_context(|| format!("loading config {}", path))?
        }
        None => ViewerConfig::default(),
    };
    log::info!(
        "atlas {} + {}",
        config.atlas.meta.display(),
        config.atlas.image.display()
    );

    run_viewer(config)
}
