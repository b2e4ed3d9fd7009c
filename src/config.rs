use std::time::Duration;

/// 运行时覆盖资源地址的环境变量
pub const ASSETS_ENV: &str = "ALPHABET_ASSETS";

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: &'static str,
    pub app_version: &'static str,

    // 音频资源位置（动态部分，可在运行时修改）
    pub assets_base: String,
    pub assets_extension: &'static str,

    // 计分规则
    pub reward: u32,
    pub penalty: u32,
    pub next_round_delay: Duration,

    // 播放设备
    pub playback_device: &'static str,
    pub playback_channels: u32,

    // 界面
    pub frame_interval: Duration,
    pub log_file: &'static str,
}

impl Config {
    /// 从编译时设置的环境变量创建配置
    /// 所有参数都在编译时从 config.toml 中读取
    pub fn new() -> Result<Self, &'static str> {
        Ok(Self {
            app_name: env!("APP_NAME"),
            app_version: env!("APP_VERSION"),

            assets_base: env!("ASSETS_BASE").to_string(),
            assets_extension: env!("ASSETS_EXTENSION"),

            reward: env!("GAME_REWARD").parse()
                .map_err(|_| "Failed to parse GAME_REWARD")?,
            penalty: env!("GAME_PENALTY").parse()
                .map_err(|_| "Failed to parse GAME_PENALTY")?,
            next_round_delay: Duration::from_millis(
                env!("GAME_NEXT_ROUND_DELAY_MS").parse()
                    .map_err(|_| "Failed to parse GAME_NEXT_ROUND_DELAY_MS")?,
            ),

            playback_device: env!("AUDIO_PLAYBACK_DEVICE"),
            playback_channels: env!("AUDIO_PLAYBACK_CHANNELS").parse()
                .map_err(|_| "Failed to parse AUDIO_PLAYBACK_CHANNELS")?,

            frame_interval: Duration::from_millis(
                env!("UI_FRAME_MS").parse()
                    .map_err(|_| "Failed to parse UI_FRAME_MS")?,
            ),
            log_file: env!("UI_LOG_FILE"),
        })
    }

    /// Apply the `ALPHABET_ASSETS` override, if set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var(ASSETS_ENV) {
            let trimmed = base.trim();
            if !trimmed.is_empty() {
                self.assets_base = trimmed.to_string();
            }
        }
        self
    }

    pub fn scoring(&self) -> crate::game::Scoring {
        crate::game::Scoring {
            reward: self.reward,
            penalty: self.penalty,
            next_round_delay: self.next_round_delay,
        }
    }
}
