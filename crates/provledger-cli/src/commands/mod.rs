//! Command implementations.

pub mod delete;
pub mod get;
pub mod init;
pub mod inspect;
pub mod invoke;
pub mod set;

pub use self::delete::execute_delete;
pub use self::get::execute_get;
pub use self::init::execute_init;
pub use self::inspect::execute_inspect;
pub use self::invoke::execute_invoke;
pub use self::set::execute_set;

use crate::error::{CliError, Result};
use provledger_contract::Response;

/// Payload of a successful response, the message of a failed one as error.
pub(crate) fn accepted(response: Response) -> Result<Vec<u8>> {
    match response {
        Response::Success(payload) => Ok(payload),
        Response::Error(message) => Err(CliError::Rejected(message)),
    }
}
