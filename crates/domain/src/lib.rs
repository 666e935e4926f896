//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod chart;
mod collection;
mod condition;
mod custom_action;
mod filter;
mod selection;

pub use chart::{ChartAggregator, ChartRequest, ChartType};
pub use collection::{COMPOSITE_ID_SEPARATOR, CollectionActionEvent, CollectionDescriptor};
pub use condition::{ConditionGroup, RoleConditions};
pub use custom_action::{CustomActionPayload, CustomActionRequest, RecordsCounterParams};
pub use filter::{FilterAggregator, FilterBranch, FilterLeaf, FilterOperator, FilterTree};
pub use selection::RecordSelection;
