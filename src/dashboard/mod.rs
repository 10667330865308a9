//! 终端展示：日志面板、自动滚动与完成动画

pub mod celebration;
pub mod log_pane;
pub mod scroll;

pub use celebration::{Celebration, CelebrationCanvas, Fireworks, TerminalCanvas, DEFAULT_DURATION};
pub use log_pane::LogPane;
pub use scroll::{ScrollController, ScrollDebouncer, ScrollSurface, SCROLL_QUIET_WINDOW};
