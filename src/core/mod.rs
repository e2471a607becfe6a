pub mod aggregator;
pub mod etl;
pub mod layout;
pub mod palette;
pub mod pipeline;
pub mod semester;

pub use crate::domain::model::{SemesterRecords, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
