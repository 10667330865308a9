//! 分析完成后的烟花动画

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// 动画默认时长
pub const DEFAULT_DURATION: Duration = Duration::from_millis(4000);
/// 约 60 帧每秒
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub const CANVAS_WIDTH: f64 = 600.0;
pub const CANVAS_HEIGHT: f64 = 600.0;

const PALETTE: [&str; 5] = ["#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeead"];
const BURST_CHANCE: f64 = 0.1;
const BURST_PARTICLES: usize = 30;
const BURST_SPREAD: f64 = 50.0;
const MAX_SPEED: f64 = 2.0;
const GRAVITY: f64 = 0.05;
const FADE: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub alpha: f64,
    pub color: &'static str,
}

impl Particle {
    fn update(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;
        self.alpha -= FADE;
    }

    fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

/// 粒子系统
pub struct Fireworks {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl Fireworks {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            particles: Vec::new(),
            rng,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// 在画布中心附近放一朵烟花，同一朵烟花的粒子颜色相同
    pub fn spawn_burst(&mut self) {
        let x = self.width / 2.0 + self.rng.gen_range(-BURST_SPREAD..BURST_SPREAD);
        let y = self.height / 2.0 + self.rng.gen_range(-BURST_SPREAD..BURST_SPREAD);
        let color = PALETTE[self.rng.gen_range(0..PALETTE.len())];

        for _ in 0..BURST_PARTICLES {
            let vx = self.rng.gen_range(-MAX_SPEED..MAX_SPEED);
            let vy = self.rng.gen_range(-MAX_SPEED..MAX_SPEED);
            self.particles.push(Particle {
                x,
                y,
                vx,
                vy,
                alpha: 1.0,
                color,
            });
        }
    }

    /// 推进一帧
    pub fn tick(&mut self) {
        if self.rng.gen_bool(BURST_CHANCE) {
            self.spawn_burst();
        }

        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

impl Default for Fireworks {
    fn default() -> Self {
        Self::new()
    }
}

/// 动画的绘制目标
pub trait CelebrationCanvas: Send {
    fn draw(&mut self, fireworks: &Fireworks);

    fn clear(&mut self);
}

/// 单行终端烟花条
pub struct TerminalCanvas<W: Write + Send> {
    writer: W,
    columns: usize,
}

impl TerminalCanvas<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr(), 60)
    }
}

impl<W: Write + Send> TerminalCanvas<W> {
    pub fn new(writer: W, columns: usize) -> Self {
        Self {
            writer,
            columns: columns.max(1),
        }
    }

    /// 将粒子按横坐标投影到一行字符
    pub fn render_strip(&self, fireworks: &Fireworks) -> String {
        let (width, _) = fireworks.size();
        let mut cells = vec![' '; self.columns];

        for particle in fireworks.particles() {
            if particle.x < 0.0 || particle.x >= width {
                continue;
            }
            let col = ((particle.x / width) * self.columns as f64) as usize;
            let glyph = if particle.alpha > 0.66 {
                '*'
            } else if particle.alpha > 0.33 {
                '+'
            } else {
                '.'
            };
            if let Some(cell) = cells.get_mut(col.min(self.columns - 1)) {
                if *cell == ' ' || glyph == '*' {
                    *cell = glyph;
                }
            }
        }

        cells.into_iter().collect()
    }
}

impl<W: Write + Send> CelebrationCanvas for TerminalCanvas<W> {
    fn draw(&mut self, fireworks: &Fireworks) {
        let strip = self.render_strip(fireworks);
        let _ = write!(self.writer, "\r{}", strip);
        let _ = self.writer.flush();
    }

    fn clear(&mut self) {
        let _ = write!(self.writer, "\r{}\r", " ".repeat(self.columns));
        let _ = self.writer.flush();
    }
}

/// 运行中的庆祝动画
///
/// 到时或调用 [`Celebration::stop`] 后结束，结束时清空画布并调用一次完成回调。
/// 释放句柄等同于 `stop`。
pub struct Celebration {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Celebration {
    pub fn start<C, F>(duration: Duration, canvas: C, on_complete: F) -> Self
    where
        C: CelebrationCanvas + 'static,
        F: FnOnce() + Send + 'static,
    {
        Self::start_with(duration, Fireworks::new(), canvas, on_complete)
    }

    pub fn start_with<C, F>(duration: Duration, mut fireworks: Fireworks, mut canvas: C, on_complete: F) -> Self
    where
        C: CelebrationCanvas + 'static,
        F: FnOnce() + Send + 'static,
    {
        let (stop, mut stopped) = oneshot::channel();

        let task = tokio::spawn(async move {
            let deadline = tokio::time::sleep(duration);
            tokio::pin!(deadline);
            let mut frames = tokio::time::interval(FRAME_INTERVAL);

            loop {
                tokio::select! {
                    _ = &mut deadline => break,
                    _ = &mut stopped => break,
                    _ = frames.tick() => {
                        fireworks.tick();
                        canvas.draw(&fireworks);
                    }
                }
            }

            fireworks.clear();
            canvas.clear();
            on_complete();
        });

        Self {
            stop: Some(stop),
            task: Some(task),
        }
    }

    /// 提前结束动画
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// 等待动画结束
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "庆祝动画任务异常结束");
            }
        }
    }
}

impl Drop for Celebration {
    fn drop(&mut self) {
        self.stop();
    }
}
