//! Text rendering from a pre-baked MSDF font atlas, with the GPU cost of
//! every frame measured through timestamp queries.
//!
//! The per-frame path: [`layout::GlyphLayoutEngine`] turns text into
//! [`layout::DrawCommand`]s, [`renderer::Renderer`] draws one quad per command
//! while a [`timer_query::GpuTimerQuery`] brackets the batch, and the results
//! land in [`stats::FrameStatistics`].

pub mod app;
pub mod atlas_meta;
pub mod config;
pub mod error;
pub mod font_atlas;
pub mod layout;
pub mod render_style;
pub mod renderer;
pub mod scheduler;
pub mod stats;
pub mod timer_query;
pub mod utils;

pub use atlas_meta::{FontAtlasMeta, GlyphMetrics, GlyphRecord};
pub use config::{TextParams, ViewerConfig};
pub use error::{AtlasError, ConfigError, DataIntegrityError, InitializationError};
pub use font_atlas::{AtlasSource, FontAtlas};
pub use layout::{DrawCommand, GlyphLayoutEngine, TextLayout};
pub use render_style::RenderStyle;
pub use renderer::{GpuContext, Renderer};
pub use stats::{FrameStatistics, TimingReport};
pub use timer_query::{GpuTimerQuery, QueryState};
