mod generate_request_id;

pub use generate_request_id::generate_request_id;
