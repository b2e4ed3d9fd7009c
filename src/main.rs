mod audio;
mod config;
mod game;
mod input_bridge;
mod round;
mod ui;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use audio::{AudioLibrary, AudioSink, Effect, SymphoniaDecoder, source_for};
use config::Config;
use game::{Game, Outcome};
use input_bridge::{InputBridge, InputEvent};
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tokio::signal;
use tokio::sync::mpsc;
use ui::{Celebration, LetterSlots, Screen};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    let config = Config::new().map_err(anyhow::Error::msg)?.with_env_overrides();

    // 初始化日志，写文件以免干扰终端界面
    init_logging(&config)?;
    log::info!(
        "{} {} starting, assets: {}",
        config.app_name,
        config.app_version,
        config.assets_base
    );

    let library = Arc::new(AudioLibrary::new(
        source_for(&config.assets_base),
        Arc::new(SymphoniaDecoder),
        make_sink(&config),
        config.assets_extension,
    ));

    // 输入事件通道
    let (tx_input, mut rx_input) = mpsc::channel::<InputEvent>(100);

    let mut terminal = ratatui::try_init().context("Failed to set up terminal")?;
    if let Err(e) = execute!(std::io::stdout(), EnableMouseCapture) {
        log::warn!("Mouse capture unavailable: {}", e);
    }

    let result = match InputBridge::new(tx_input).spawn() {
        Ok(_) => run(&mut terminal, &config, library, &mut rx_input).await,
        Err(e) => Err(e).context("Failed to start input thread"),
    };

    if let Err(e) = execute!(std::io::stdout(), DisableMouseCapture) {
        log::warn!("Failed to release mouse capture: {}", e);
    }
    ratatui::restore();
    log::info!("Bye");
    result
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[cfg(feature = "alsa")]
fn make_sink(config: &Config) -> Arc<dyn AudioSink> {
    log::info!(
        "Playback device: {} ({}ch)",
        config.playback_device,
        config.playback_channels
    );
    Arc::new(audio::AlsaSink::new(config.playback_device, config.playback_channels))
}

#[cfg(not(feature = "alsa"))]
fn make_sink(config: &Config) -> Arc<dyn AudioSink> {
    log::warn!(
        "Built without the `alsa` feature; device {} ({}ch) unused, playing silently",
        config.playback_device,
        config.playback_channels
    );
    Arc::new(audio::SilentSink)
}

/// 主事件循环：预加载完成前显示加载界面，之后处理输入和帧刷新
async fn run(
    terminal: &mut DefaultTerminal,
    config: &Config,
    library: Arc<AudioLibrary>,
    rx_input: &mut mpsc::Receiver<InputEvent>,
) -> anyhow::Result<()> {
    let mut screen = Screen::Loading;
    let mut game = Game::new(config.scoring());
    let mut celebration = Celebration::new();
    let mut slots = LetterSlots::default();
    let mut ticker = tokio::time::interval(config.frame_interval);

    let mut preload = {
        let library = library.clone();
        tokio::spawn(async move { library.preload().await })
    };

    // raw 模式下 Ctrl+C 以按键事件到达，这里只处理外部发来的 SIGINT
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                log::info!("Received Ctrl+C, shutting down...");
                break;
            }

            result = &mut preload, if screen == Screen::Loading => {
                screen = match result {
                    Ok(report) if report.all_letters_failed() => {
                        log::error!("No letter audio could be loaded");
                        Screen::Error
                    }
                    Ok(_) => Screen::Playing,
                    Err(e) => {
                        log::error!("Preload task failed: {}", e);
                        Screen::Error
                    }
                };
            }

            _ = ticker.tick() => {
                let now = Instant::now();
                if screen == Screen::Playing {
                    game.poll(now);
                }
                celebration.tick(now);
                terminal
                    .draw(|frame| slots = ui::draw(frame, screen, &game, &celebration, now))
                    .context("Failed to draw")?;
            }

            event = rx_input.recv() => {
                let Some(event) = event else {
                    log::warn!("Input channel closed");
                    break;
                };
                if event == InputEvent::Quit {
                    break;
                }
                if screen != Screen::Playing {
                    continue;
                }

                let now = Instant::now();
                let outcome = match event {
                    InputEvent::PlaySound => {
                        let letter = game.round().target_letter();
                        let library = library.clone();
                        tokio::spawn(async move { library.play_letter(letter).await });
                        Outcome::Ignored
                    }
                    InputEvent::SelectPosition(position) => game.select(position, now),
                    InputEvent::SelectLetter(letter) => game.select_letter(letter, now),
                    InputEvent::Click { column, row } => match slots.hit(column, row) {
                        Some(position) => game.select(position, now),
                        None => Outcome::Ignored,
                    },
                    InputEvent::Quit => Outcome::Ignored,
                };
                give_feedback(outcome, &library, &mut celebration, now);
            }
        }
    }
    Ok(())
}

fn give_feedback(outcome: Outcome, library: &AudioLibrary, celebration: &mut Celebration, now: Instant) {
    match outcome {
        Outcome::Correct => {
            library.play_effect(Effect::Correct);
            celebration.burst(now, &mut rand::thread_rng());
        }
        Outcome::Wrong => library.play_effect(Effect::Incorrect),
        Outcome::Ignored => {}
    }
}
