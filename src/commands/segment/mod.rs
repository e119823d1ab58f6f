mod assemble;
mod headings;
mod run;
mod snowflake;
mod spans;
mod store;

pub use assemble::{RequirementFilter, requirement_view};
pub use run::run;
pub use snowflake::{
    decode_datacenter_id, decode_sequence, decode_timestamp_millis, decode_worker_id,
};
pub use store::{count_batches, count_segments, select_segments_by_batch};
