mod job;
mod worker;

pub use job::{delete_job, get_job_result, get_job_status, submit_json_job, submit_multipart_job};
pub use worker::{
    get_raw_work, get_sequence, get_work, get_work_status, pulse, register_worker, submit_result,
};
