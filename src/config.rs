pub mod document;
pub mod lenient;
pub mod matcher;

pub use document::{parse_config, ConfigDocument, LabelerConfig};
pub use matcher::{non_empty, AgeRange, AgeSetting, LabelMatcher, SizeConfig};
