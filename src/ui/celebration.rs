use std::time::{Duration, Instant};

use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Context, Line},
    },
};

// --- 画布配置 ---
const CANVAS_X_BOUND: f64 = 100.0;
const CANVAS_Y_BOUND: f64 = 40.0;

const SPARKS_PER_BURST: usize = 5;
const SPARK_LIFETIME: Duration = Duration::from_millis(1000);
const MAX_START_DELAY_MS: u64 = 500;
const RAYS: usize = 8;

// --- 配色 ---
const PALETTE: [Color; 5] = [
    Color::Rgb(255, 215, 0),  // 金
    Color::Rgb(255, 40, 220), // 紫
    Color::Rgb(0, 245, 255),  // 蓝
    Color::Rgb(57, 255, 20),  // 绿
    Color::Rgb(255, 99, 71),  // 橙红
];

struct Spark {
    /// Horizontal position in canvas units, 0..CANVAS_X_BOUND.
    x: f64,
    start: Instant,
    color: Color,
}

impl Spark {
    /// 0.0..1.0 while visible, None before start or after expiry.
    fn progress(&self, now: Instant) -> Option<f64> {
        let age = now.checked_duration_since(self.start)?;
        if age >= SPARK_LIFETIME {
            return None;
        }
        Some(age.as_secs_f64() / SPARK_LIFETIME.as_secs_f64())
    }

    fn expired(&self, now: Instant) -> bool {
        now >= self.start + SPARK_LIFETIME
    }
}

/// Short burst of sparks shown after a correct answer.
#[derive(Default)]
pub struct Celebration {
    sparks: Vec<Spark>,
}

impl Celebration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch sparks at random positions with random start delays.
    pub fn burst<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        for _ in 0..SPARKS_PER_BURST {
            self.sparks.push(Spark {
                x: rng.gen_range(0.0..CANVAS_X_BOUND),
                start: now + Duration::from_millis(rng.gen_range(0..=MAX_START_DELAY_MS)),
                color: PALETTE[rng.gen_range(0..PALETTE.len())],
            });
        }
    }

    /// Drop sparks whose animation finished.
    pub fn tick(&mut self, now: Instant) {
        self.sparks.retain(|s| !s.expired(now));
    }

    pub fn is_active(&self) -> bool {
        !self.sparks.is_empty()
    }

    pub fn widget(&self, now: Instant) -> CelebrationWidget<'_> {
        CelebrationWidget { celebration: self, now }
    }
}

pub struct CelebrationWidget<'a> {
    celebration: &'a Celebration,
    now: Instant,
}

impl Widget for CelebrationWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, CANVAS_X_BOUND])
            .y_bounds([0.0, CANVAS_Y_BOUND])
            .paint(|ctx| {
                for spark in &self.celebration.sparks {
                    let Some(t) = spark.progress(self.now) else {
                        continue;
                    };
                    // 前 40% 上升，之后绽放
                    if t < 0.4 {
                        let y = CANVAS_Y_BOUND * 0.7 * (t / 0.4);
                        ctx.draw(&Line {
                            x1: spark.x,
                            y1: (y - 3.0).max(0.0),
                            x2: spark.x,
                            y2: y,
                            color: spark.color,
                        });
                    } else {
                        let bloom = (t - 0.4) / 0.6;
                        draw_bloom(ctx, spark.x, CANVAS_Y_BOUND * 0.7, bloom, spark.color);
                    }
                }
            })
            .render(area, buf);
    }
}

fn draw_bloom(ctx: &mut Context, cx: f64, cy: f64, t: f64, color: Color) {
    let inner = 2.0 + 6.0 * t;
    let outer = inner + 3.0 * (1.0 - t);
    for i in 0..RAYS {
        let theta = (i as f64 / RAYS as f64) * std::f64::consts::PI * 2.0;
        let (sin, cos) = theta.sin_cos();
        ctx.draw(&Line {
            x1: cx + inner * cos,
            y1: cy + inner * sin * 0.5,
            x2: cx + outer * cos,
            y2: cy + outer * sin * 0.5,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn burst_lives_about_a_second() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut celebration = Celebration::new();
        let t0 = Instant::now();
        assert!(!celebration.is_active());

        celebration.burst(t0, &mut rng);
        assert_eq!(celebration.sparks.len(), SPARKS_PER_BURST);
        celebration.tick(t0 + Duration::from_millis(900));
        assert!(celebration.is_active());

        celebration.tick(t0 + SPARK_LIFETIME + Duration::from_millis(MAX_START_DELAY_MS));
        assert!(!celebration.is_active());
    }

    #[test]
    fn sparks_wait_for_their_delay() {
        let t0 = Instant::now();
        let spark = Spark {
            x: 10.0,
            start: t0 + Duration::from_millis(200),
            color: Color::White,
        };
        assert_eq!(spark.progress(t0), None);
        assert!(spark.progress(t0 + Duration::from_millis(700)).is_some());
        assert_eq!(spark.progress(t0 + Duration::from_millis(1200)), None);
    }

    #[test]
    fn renders_without_panicking() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut celebration = Celebration::new();
        let t0 = Instant::now();
        celebration.burst(t0, &mut rng);

        let area = Rect::new(0, 0, 40, 10);
        for ms in [0u64, 300, 600, 1200] {
            let mut buf = Buffer::empty(area);
            celebration
                .widget(t0 + Duration::from_millis(ms))
                .render(area, &mut buf);
        }
    }
}
