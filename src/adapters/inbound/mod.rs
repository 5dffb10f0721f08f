mod api_server;

pub use api_server::{router, ApiServer, ErrorResponse, HealthResponse, LangQuery};
