#![allow(dead_code)]

mod builders;
mod mock_upstream;

pub use builders::*;
pub use mock_upstream::{MockUpstream, UpstreamMode, OVERSIZED_ANSWER_COUNT};
