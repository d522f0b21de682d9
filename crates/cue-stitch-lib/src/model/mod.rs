pub mod session;
pub mod stitched_context;
pub mod turn;
