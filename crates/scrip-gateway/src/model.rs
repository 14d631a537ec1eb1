pub mod codes;
pub mod health;

pub use codes::{
    CodeResponse, CreateCodesRequest, CreateCodesResponse, PageQuery, PageResponse, PurgeResponse,
    SearchQuery, UpdateCodeRequest, UpdateStatusRequest,
};
pub use health::HealthResponse;
