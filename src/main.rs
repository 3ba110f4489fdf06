use anyhow::{Context, Result};
use crossbeam_channel::bounded;

use swipe_backdrop::{
    backgrounds::BackgroundCarousel,
    config::{AppConfig, PLACEHOLDER_BACKGROUNDS},
    pipeline::{self, FrameSink, PngSink, ScriptedSensor, demo_script, start_sensor_stream},
    session::Session,
};

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_args(std::env::args().skip(1));

    let carousel = if config.backgrounds_dir.is_dir() {
        BackgroundCarousel::load_dir(&config.backgrounds_dir).with_context(|| {
            format!(
                "failed to load backgrounds from {}",
                config.backgrounds_dir.display()
            )
        })?
    } else {
        log::warn!(
            "{} not found, using built-in backgrounds",
            config.backgrounds_dir.display()
        );
        let (width, height) = config.cutout_size;
        BackgroundCarousel::placeholders(PLACEHOLDER_BACKGROUNDS, width, height)?
    };
    let buttons = carousel.buttons();
    log::info!(
        "{} backgrounds, buttons {:?}",
        carousel.len(),
        buttons.iter().map(|b| b.name.as_str()).collect::<Vec<_>>()
    );

    let mut session = Session::new(config.swipe, carousel);
    let mut sink = PngSink::new(&config.output_dir)?;
    sink.present(&session.render()?)?;

    // One frame in flight between the sensor and the session.
    let (frame_tx, frame_rx) = bounded(1);
    let sensor = ScriptedSensor::new(demo_script(), config.cutout_size, config.frame_interval);
    let stream = start_sensor_stream(sensor, frame_tx);

    let stats = pipeline::run_session_loop(&mut session, frame_rx, &stream, &mut sink)?;
    stream.stop();

    sink.present(&session.render()?)?;
    log::info!(
        "processed {} frames, {} gestures, {} background changes; wrote {} images to {}",
        stats.frames,
        stats.gestures,
        stats.background_changes,
        sink.written(),
        config.output_dir.display()
    );

    Ok(())
}
