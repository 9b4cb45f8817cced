mod epub;
pub use epub::{FontConfig, MetadataConfig, RenderStats, EPUB};
