pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod collapse;
pub mod colors;
pub mod config;
pub mod drag;
pub mod filter;
pub mod layout;
pub mod layout_dump;
pub mod persist;
pub mod plan;
pub mod status;
pub mod tree;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use catalog::{Catalog, normalize_catalog};
pub use config::{Config, LayoutConfig, ProgramConfig, load_config};
pub use filter::{FilterState, ProgramVariant, RawFilters};
pub use persist::{PersistError, ViewSnapshot};
pub use status::{CourseStatus, CourseStatusSource};
pub use tree::{TreeNode, build_tree};
pub use view::{GraphView, RenderSet};
