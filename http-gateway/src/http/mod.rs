mod server;
pub use server::Server;

mod handle;
use handle::handle;

mod response;
pub use response::ErrorResponse;
