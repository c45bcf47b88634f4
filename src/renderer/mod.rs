pub mod cache;
pub mod components;
pub mod fragment;
pub mod list;
pub mod renderer;
pub mod renders;
pub mod table;
pub mod traits;
pub mod wrap;

pub use cache::*;
pub use fragment::*;
pub use renderer::*;
pub use traits::*;
