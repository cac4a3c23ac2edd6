pub mod formatting;
pub mod style;
pub mod table_renderer;
