use std::fs;
use std::path::Path;
use serde::Deserialize;

#[derive(Deserialize)]
struct Config {
    application: Application,
    assets: Assets,
    game: Game,
    audio: Audio,
    ui: Ui,
}

#[derive(Deserialize)]
struct Application {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct Assets {
    base: String,
    extension: String,
}

#[derive(Deserialize)]
struct Game {
    reward: u32,
    penalty: u32,
    next_round_delay_ms: u64,
}

#[derive(Deserialize)]
struct Audio {
    playback_device: String,
    channels: u32,
}

#[derive(Deserialize)]
struct Ui {
    frame_ms: u64,
    log_file: String,
}

// 在编译时读取 config.toml 并设置环境变量
fn main() {
    println!("cargo:rerun-if-changed=config.toml");

    let config_path = Path::new("config.toml");
    if !config_path.exists() {
        panic!("config.toml not found!");
    }

    let config_str = fs::read_to_string(config_path).expect("Failed to read config.toml");
    let config: Config = toml::from_str(&config_str).expect("Failed to parse config.toml");

    // 应用信息
    println!("cargo:rustc-env=APP_NAME={}", config.application.name);
    println!("cargo:rustc-env=APP_VERSION={}", config.application.version);

    // 音频资源
    println!("cargo:rustc-env=ASSETS_BASE={}", config.assets.base);
    println!("cargo:rustc-env=ASSETS_EXTENSION={}", config.assets.extension);

    // 计分规则
    println!("cargo:rustc-env=GAME_REWARD={}", config.game.reward);
    println!("cargo:rustc-env=GAME_PENALTY={}", config.game.penalty);
    println!("cargo:rustc-env=GAME_NEXT_ROUND_DELAY_MS={}", config.game.next_round_delay_ms);

    // 播放设备
    println!("cargo:rustc-env=AUDIO_PLAYBACK_DEVICE={}", config.audio.playback_device);
    println!("cargo:rustc-env=AUDIO_PLAYBACK_CHANNELS={}", config.audio.channels);

    // 界面
    println!("cargo:rustc-env=UI_FRAME_MS={}", config.ui.frame_ms);
    println!("cargo:rustc-env=UI_LOG_FILE={}", config.ui.log_file);
}
