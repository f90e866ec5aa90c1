mod domain;
pub use domain::{LabelName, Labels, PeriodMs, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod spec;
pub use spec::{CommandLabel, LabelSpec};

mod result;
pub use result::{LabelResult, LabelStatus};
